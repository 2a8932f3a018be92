//! Money-transfer lifecycle shared by the storage implementations.
//!
//! A transaction starts `Pending` and is resolved exactly once to `Accepted` or `Rejected`.
//! Balances only move when a transaction becomes `Accepted`.

use crate::transaction_repo::TransactionRepoError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TransferState {
    Pending,
    Accepted,
    Rejected,
}

impl TransferState {
    pub const fn from_accepted(accepted: Option<bool>) -> TransferState {
        match accepted {
            None => TransferState::Pending,
            Some(true) => TransferState::Accepted,
            Some(false) => TransferState::Rejected,
        }
    }

    pub const fn accepted(self) -> Option<bool> {
        match self {
            TransferState::Pending => None,
            TransferState::Accepted => Some(true),
            TransferState::Rejected => Some(false),
        }
    }

    pub const fn is_resolved(self) -> bool {
        !matches!(self, TransferState::Pending)
    }

    pub const fn moves_funds(self) -> bool {
        matches!(self, TransferState::Accepted)
    }

    /// Next state of the transaction `transaction_id`, or `AlreadyResolved` if it left `Pending`.
    pub fn resolve(
        self,
        transaction_id: i64,
        accept: bool,
    ) -> Result<TransferState, TransactionRepoError> {
        if self.is_resolved() {
            return Err(TransactionRepoError::AlreadyResolved(transaction_id));
        }
        Ok(TransferState::from_accepted(Some(accept)))
    }
}

pub fn ensure_funds(user_id: i64, balance: i64, amount: i64) -> Result<(), TransactionRepoError> {
    if balance < amount {
        Err(TransactionRepoError::InsufficientFunds {
            user_id,
            balance,
            amount,
        })
    } else {
        Ok(())
    }
}

/// Checks that `amount` can move from sender to receiver without either balance leaving the
/// range of `i64`. Nothing is written, so a failure leaves both balances untouched.
pub fn check_settlement(
    sender_id: i64,
    sender_balance: i64,
    receiver_id: i64,
    receiver_balance: i64,
    amount: i64,
) -> Result<(), TransactionRepoError> {
    ensure_funds(sender_id, sender_balance, amount)?;
    let overflow = |user_id| TransactionRepoError::BalanceOverflow { user_id, amount };

    sender_balance
        .checked_sub(amount)
        .ok_or_else(|| overflow(sender_id))?;
    // a self-transfer nets out to the starting balance
    if sender_id != receiver_id {
        receiver_balance
            .checked_add(amount)
            .ok_or_else(|| overflow(receiver_id))?;
    }
    Ok(())
}
