use crate::sqlx_repo::SQLxRepo;
use crate::user_repo::UserRepoError::UserNotFound;
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i64,
    name: String,
    username: String,
    balance: i64,
}

impl From<UserEntry> for User {
    fn from(value: UserEntry) -> Self {
        User {
            id: value.id,
            name: value.name,
            username: value.username,
            balance: value.balance,
        }
    }
}

#[async_trait]
impl UserRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError> {
        let users = query_as::<_, UserEntry>(
            "SELECT id, name, username, balance FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Unable to get users")?
        .into_iter()
        .map(|user_entry| user_entry.into())
        .collect();
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<User, UserRepoError> {
        let user: Option<UserEntry> = query_as::<_, UserEntry>(
            "SELECT id, name, username, balance FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user {}", user_id))?;
        user.map(|user_entry| user_entry.into())
            .ok_or(UserNotFound(user_id))
    }

    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let id = query("INSERT INTO users (name, username, balance) VALUES (?, ?, ?)")
            .bind(new_user.name)
            .bind(new_user.username)
            .bind(new_user.balance)
            .execute(&self.pool)
            .await
            .context("Unable to insert user")?
            .last_insert_rowid();

        self.get_user(id).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<User, UserRepoError> {
        let user_entry = query_as::<_, UserEntry>(
            "DELETE FROM users WHERE id = ? RETURNING id, name, username, balance",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to delete user {}", user_id))?
        .ok_or(UserNotFound(user_id))?;
        Ok(user_entry.into())
    }
}
