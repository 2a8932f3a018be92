use crate::transaction_repo::{
    NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use crate::transfer::check_settlement;
use crate::user_repo::UserRepoError::UserNotFound;
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError};
use crate::HealthCheck;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct State {
    users: BTreeMap<i64, User>,
    transactions: BTreeMap<i64, Transaction>,
    next_user_id: i64,
    next_transaction_id: i64,
}

impl State {
    /// Validates and applies a transfer. Nothing is modified when an error is returned.
    fn settle(
        &mut self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<(), TransactionRepoError> {
        let balance_of = |user_id| {
            self.users
                .get(&user_id)
                .map(|user| user.balance)
                .ok_or(TransactionRepoError::UserNotFound(user_id))
        };
        let sender_balance = balance_of(sender_id)?;
        let receiver_balance = balance_of(receiver_id)?;
        check_settlement(
            sender_id,
            sender_balance,
            receiver_id,
            receiver_balance,
            amount,
        )?;

        if let Some(sender) = self.users.get_mut(&sender_id) {
            sender.balance -= amount;
        }
        if let Some(receiver) = self.users.get_mut(&receiver_id) {
            receiver.balance += amount;
        }
        Ok(())
    }
}

pub struct MemPaymentRepo {
    state: RwLock<State>,
}

impl MemPaymentRepo {
    pub fn new() -> MemPaymentRepo {
        let state = State {
            users: BTreeMap::new(),
            transactions: BTreeMap::new(),
            next_user_id: 1,
            next_transaction_id: 1,
        };
        MemPaymentRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

#[async_trait]
impl UserRepo for MemPaymentRepo {
    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let read_guard = self.read_lock()?;
        Ok(read_guard.users.values().cloned().collect())
    }

    async fn get_user(&self, user_id: i64) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;
        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_user_id;
        write_guard.next_user_id += 1;
        let user = User {
            id,
            name: new_user.name,
            username: new_user.username,
            balance: new_user.balance,
        };
        write_guard.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;
        write_guard
            .users
            .remove(&user_id)
            .ok_or(UserNotFound(user_id))
    }
}

#[async_trait]
impl TransactionRepo for MemPaymentRepo {
    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;
        Ok(read_guard.transactions.values().cloned().collect())
    }

    async fn get_transaction(
        &self,
        transaction_id: i64,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;
        read_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionRepoError::TransactionNotFound(transaction_id))
    }

    async fn get_user_transactions(
        &self,
        user_id: i64,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let sent = read_guard
            .transactions
            .values()
            .filter(|t| t.sender_id == user_id);
        let received = read_guard
            .transactions
            .values()
            .filter(|t| t.receiver_id == user_id && t.sender_id != user_id);
        Ok(sent.chain(received).cloned().collect())
    }

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if new_transaction.state().moves_funds() {
            write_guard.settle(
                new_transaction.sender_id,
                new_transaction.receiver_id,
                new_transaction.amount,
            )?;
        }

        let id = write_guard.next_transaction_id;
        write_guard.next_transaction_id += 1;
        let transaction = Transaction {
            id,
            timestamp: new_transaction.timestamp,
            sender_id: new_transaction.sender_id,
            receiver_id: new_transaction.receiver_id,
            amount: new_transaction.amount,
            message: new_transaction.message,
            accepted: new_transaction.accepted,
        };
        write_guard.transactions.insert(id, transaction.clone());
        Ok(transaction)
    }

    async fn resolve_transaction(
        &self,
        transaction_id: i64,
        accepted: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let transaction = write_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionRepoError::TransactionNotFound(transaction_id))?;
        let next_state = transaction.state().resolve(transaction_id, accepted)?;

        if next_state.moves_funds() {
            write_guard.settle(
                transaction.sender_id,
                transaction.receiver_id,
                transaction.amount,
            )?;
        }

        let updated = Transaction {
            timestamp,
            accepted: next_state.accepted(),
            ..transaction
        };
        write_guard.transactions.insert(transaction_id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl HealthCheck for MemPaymentRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}
