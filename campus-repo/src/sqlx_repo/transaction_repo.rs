use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{TransactionNotFound, UserNotFound};
use crate::transaction_repo::{
    NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use crate::transfer::check_settlement;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar, Executor, Sqlite, SqliteConnection};
use tracing::{info, instrument};

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i64,
    timestamp: DateTime<Utc>,
    sender_id: i64,
    receiver_id: i64,
    amount: i64,
    message: Option<String>,
    accepted: Option<bool>,
}

impl From<TransactionEntry> for Transaction {
    fn from(value: TransactionEntry) -> Self {
        Transaction {
            id: value.id,
            timestamp: value.timestamp,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            amount: value.amount,
            message: value.message,
            accepted: value.accepted,
        }
    }
}

impl SQLxRepo {
    #[instrument(skip(db_executor))]
    async fn get_transaction_entry<'e, E>(
        db_executor: E,
        transaction_id: i64,
    ) -> Result<Option<TransactionEntry>, TransactionRepoError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let transaction_entry = query_as::<_, TransactionEntry>(
            r#"
            SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(db_executor)
        .await
        .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        Ok(transaction_entry)
    }

    #[instrument(skip(db_executor, new_transaction))]
    async fn insert_transaction_entry<'e, E>(
        db_executor: E,
        new_transaction: &NewTransaction,
    ) -> Result<i64, TransactionRepoError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = query(
            r#"
            INSERT INTO transactions (timestamp, sender_id, receiver_id, amount, message, accepted)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_transaction.timestamp)
        .bind(new_transaction.sender_id)
        .bind(new_transaction.receiver_id)
        .bind(new_transaction.amount)
        .bind(new_transaction.message.clone())
        .bind(new_transaction.accepted)
        .execute(db_executor)
        .await
        .context("Unable to insert transaction")?
        .last_insert_rowid();
        Ok(id)
    }

    #[instrument(skip(conn))]
    async fn get_balance(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<i64, TransactionRepoError> {
        let balance = query_scalar::<_, i64>("SELECT balance FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .with_context(|| format!("Unable to get balance of user {}", user_id))?
            .ok_or(UserNotFound(user_id))?;
        Ok(balance)
    }

    /// Checks the sender can cover `amount` and the receiver can hold it, then debits the sender
    /// and credits the receiver.
    /// Must run inside the caller's database transaction.
    #[instrument(skip(conn))]
    async fn settle(
        conn: &mut SqliteConnection,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<(), TransactionRepoError> {
        let sender_balance = Self::get_balance(&mut *conn, sender_id).await?;
        let receiver_balance = Self::get_balance(&mut *conn, receiver_id).await?;
        check_settlement(
            sender_id,
            sender_balance,
            receiver_id,
            receiver_balance,
            amount,
        )?;

        let debited = query("UPDATE users SET balance = balance - ? WHERE id = ?")
            .bind(amount)
            .bind(sender_id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Unable to debit user {}", sender_id))?;
        if debited.rows_affected() == 0 {
            return Err(UserNotFound(sender_id));
        }

        let credited = query("UPDATE users SET balance = balance + ? WHERE id = ?")
            .bind(amount)
            .bind(receiver_id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Unable to credit user {}", receiver_id))?;
        if credited.rows_affected() == 0 {
            return Err(UserNotFound(receiver_id));
        }

        info!(sender_id, receiver_id, amount, "Settled transfer");
        Ok(())
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_all_transactions(&self) -> Result<Vec<Transaction>, TransactionRepoError> {
        let transactions = query_as::<_, TransactionEntry>(
            r#"
            SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
            FROM transactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get transactions")?
        .into_iter()
        .map(|transaction_entry| transaction_entry.into())
        .collect();
        Ok(transactions)
    }

    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        transaction_id: i64,
    ) -> Result<Transaction, TransactionRepoError> {
        Self::get_transaction_entry(&self.pool, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))
            .map(|t| t.into())
    }

    #[instrument(skip(self))]
    async fn get_user_transactions(
        &self,
        user_id: i64,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let sent = query_as::<_, TransactionEntry>(
            r#"
            SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
            FROM transactions
            WHERE sender_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get transactions sent by {}", user_id))?;

        let received = query_as::<_, TransactionEntry>(
            r#"
            SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
            FROM transactions
            WHERE receiver_id = ?
              AND sender_id <> ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get transactions received by {}", user_id))?;

        let transactions = sent
            .into_iter()
            .chain(received)
            .map(|transaction_entry| transaction_entry.into())
            .collect();
        Ok(transactions)
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let id = if new_transaction.state().moves_funds() {
            let mut db_transaction = self
                .pool
                .begin()
                .await
                .context("Unable to start transaction")?;
            Self::settle(
                &mut db_transaction,
                new_transaction.sender_id,
                new_transaction.receiver_id,
                new_transaction.amount,
            )
            .await?;
            let id = Self::insert_transaction_entry(&mut *db_transaction, &new_transaction).await?;
            db_transaction
                .commit()
                .await
                .context("Unable to commit transaction")?;
            id
        } else {
            Self::insert_transaction_entry(&self.pool, &new_transaction).await?
        };

        self.get_transaction(id).await
    }

    #[instrument(skip(self))]
    async fn resolve_transaction(
        &self,
        transaction_id: i64,
        accepted: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let transaction: Transaction =
            Self::get_transaction_entry(&mut *db_transaction, transaction_id)
                .await?
                .ok_or(TransactionNotFound(transaction_id))?
                .into();
        let next_state = transaction.state().resolve(transaction_id, accepted)?;

        if next_state.moves_funds() {
            Self::settle(
                &mut db_transaction,
                transaction.sender_id,
                transaction.receiver_id,
                transaction.amount,
            )
            .await?;
        }

        query("UPDATE transactions SET accepted = ?, timestamp = ? WHERE id = ?")
            .bind(next_state.accepted())
            .bind(timestamp)
            .bind(transaction_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to update transaction {}", transaction_id))?;
        db_transaction
            .commit()
            .await
            .context("Unable to commit transaction")?;

        self.get_transaction(transaction_id).await
    }
}
