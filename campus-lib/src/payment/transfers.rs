//! Payment operations shared by the handlers. Balance changes themselves happen inside the
//! transaction repository so that a transfer is applied atomically.

use crate::error::HandlerError;
use crate::payment::{CreateUserRequest, ResolveTransactionRequest, SendMoneyRequest, UserDetails};
use campus_repo::transaction_repo::{
    NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use campus_repo::user_repo::{NewUser, UserRepo, UserRepoError};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

pub async fn user_details(
    user_repo: &dyn UserRepo,
    transaction_repo: &dyn TransactionRepo,
    user_id: i64,
) -> Result<UserDetails, HandlerError> {
    let user = user_repo.get_user(user_id).await?;
    let transactions = transaction_repo.get_user_transactions(user_id).await?;
    Ok(UserDetails { user, transactions })
}

#[instrument(skip(user_repo))]
pub async fn create_user(
    user_repo: &dyn UserRepo,
    request: CreateUserRequest,
) -> Result<UserDetails, HandlerError> {
    let (name, username) = match (request.name, request.username) {
        (Some(name), Some(username)) => (name, username),
        _ => {
            return Err(HandlerError::Validation(
                "didn't provide name or username".to_string(),
            ))
        }
    };
    let balance = request.balance.unwrap_or(0);
    if balance < 0 {
        return Err(HandlerError::Validation(
            "balance cannot be negative".to_string(),
        ));
    }

    let user = user_repo
        .create_user(NewUser::new(name, username, balance))
        .await
        .map_err(|e| match e {
            UserRepoError::UserNotFound(_) => {
                HandlerError::Creation("Could not create user.".to_string())
            }
            e => e.into(),
        })?;
    info!(user_id = user.id, "Created user");
    Ok(UserDetails {
        user,
        transactions: Vec::new(),
    })
}

/// Deletes the user. Its transactions are kept and still returned alongside it.
pub async fn delete_user(
    user_repo: &dyn UserRepo,
    transaction_repo: &dyn TransactionRepo,
    user_id: i64,
) -> Result<UserDetails, HandlerError> {
    let user = user_repo.delete_user(user_id).await?;
    let transactions = transaction_repo.get_user_transactions(user_id).await?;
    info!(user_id, "Deleted user");
    Ok(UserDetails { user, transactions })
}

#[instrument(skip(user_repo, transaction_repo))]
pub async fn send_money(
    user_repo: &dyn UserRepo,
    transaction_repo: &dyn TransactionRepo,
    request: SendMoneyRequest,
    now: DateTime<Utc>,
) -> Result<Transaction, HandlerError> {
    let sender_id = find_user(user_repo, request.sender_id, "sender not found!").await?;
    let receiver_id = find_user(user_repo, request.receiver_id, "receiver not found!").await?;
    let amount = request
        .amount
        .ok_or_else(|| HandlerError::Validation("empty amount".to_string()))?;
    if amount <= 0 {
        return Err(HandlerError::Validation(
            "amount must be positive".to_string(),
        ));
    }

    let new_transaction = NewTransaction::new(
        now,
        sender_id,
        receiver_id,
        amount,
        request.message,
        request.accepted,
    );
    let transaction = transaction_repo
        .create_transaction(new_transaction)
        .await
        .map_err(|e| match e {
            TransactionRepoError::TransactionNotFound(_) => {
                HandlerError::Creation("Could not create transaction.".to_string())
            }
            e => e.into(),
        })?;
    info!(
        transaction_id = transaction.id,
        state = ?transaction.state(),
        "Created transaction"
    );
    Ok(transaction)
}

#[instrument(skip(transaction_repo))]
pub async fn resolve_transaction(
    transaction_repo: &dyn TransactionRepo,
    transaction_id: i64,
    request: ResolveTransactionRequest,
    now: DateTime<Utc>,
) -> Result<Transaction, HandlerError> {
    let accepted = match request.accepted {
        Some(accepted) => accepted,
        None => {
            // an unknown or settled transaction is reported before the missing flag
            let transaction = transaction_repo.get_transaction(transaction_id).await?;
            if transaction.state().is_resolved() {
                return Err(HandlerError::ImmutableState);
            }
            return Err(HandlerError::Validation("didn't provide accepted".to_string()));
        }
    };

    let transaction = transaction_repo
        .resolve_transaction(transaction_id, accepted, now)
        .await?;
    info!(transaction_id, state = ?transaction.state(), "Resolved transaction");
    Ok(transaction)
}

async fn find_user(
    user_repo: &dyn UserRepo,
    user_id: Option<i64>,
    missing_message: &str,
) -> Result<i64, HandlerError> {
    let user_id =
        user_id.ok_or_else(|| HandlerError::UnknownReference(missing_message.to_string()))?;
    match user_repo.get_user(user_id).await {
        Ok(user) => Ok(user.id),
        Err(UserRepoError::UserNotFound(_)) => {
            Err(HandlerError::UnknownReference(missing_message.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
