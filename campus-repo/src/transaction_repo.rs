use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transfer::TransferState;

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn get_transaction(&self, transaction_id: i64)
        -> Result<Transaction, TransactionRepoError>;

    /// Transactions sent by the user, followed by the ones they received from someone else.
    async fn get_user_transactions(
        &self,
        user_id: i64,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    /// Records the transaction. A transaction created already accepted moves the funds in the same
    /// unit of work and fails with `InsufficientFunds` without recording anything.
    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Moves a pending transaction to accepted or rejected, settling the balances on acceptance.
    async fn resolve_transaction(
        &self,
        transaction_id: i64,
        accepted: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i64),
    #[error("User {0} not found")]
    UserNotFound(i64),
    #[error("User {user_id} has balance {balance}, cannot send {amount}")]
    InsufficientFunds {
        user_id: i64,
        balance: i64,
        amount: i64,
    },
    #[error("Transaction {0} is already resolved")]
    AlreadyResolved(i64),
    #[error("Moving {amount} would overflow the balance of user {user_id}")]
    BalanceOverflow { user_id: i64, amount: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub message: Option<String>,
    pub accepted: Option<bool>,
}

impl Transaction {
    pub fn state(&self) -> TransferState {
        TransferState::from_accepted(self.accepted)
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewTransaction {
    pub timestamp: DateTime<Utc>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub message: Option<String>,
    pub accepted: Option<bool>,
}

impl NewTransaction {
    pub const fn new(
        timestamp: DateTime<Utc>,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
        message: Option<String>,
        accepted: Option<bool>,
    ) -> NewTransaction {
        NewTransaction {
            timestamp,
            sender_id,
            receiver_id,
            amount,
            message,
            accepted,
        }
    }

    pub fn state(&self) -> TransferState {
        TransferState::from_accepted(self.accepted)
    }
}
