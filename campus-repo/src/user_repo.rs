use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn get_all_users(&self) -> Result<Vec<User>, UserRepoError>;
    async fn get_user(&self, user_id: i64) -> Result<User, UserRepoError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;
    /// Transactions referencing the user are left in place.
    async fn delete_user(&self, user_id: i64) -> Result<User, UserRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub balance: i64,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub balance: i64,
}

impl NewUser {
    pub const fn new(name: String, username: String, balance: i64) -> NewUser {
        NewUser {
            name,
            username,
            balance,
        }
    }
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(i64),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
