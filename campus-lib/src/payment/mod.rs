use actix_web::{web, Scope};
use campus_repo::transaction_repo::Transaction;
use campus_repo::user_repo::User;
use serde::{Deserialize, Serialize};

mod handlers;
pub mod transfers;

pub fn payment_service() -> Scope {
    web::scope("/api")
        .service(handlers::get_all_users)
        .service(handlers::create_user)
        .service(handlers::get_user)
        .service(handlers::delete_user)
        .service(handlers::get_all_transactions)
        .service(handlers::send_money)
        .service(handlers::resolve_transaction)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
}

/// A user together with every transaction it sent or received.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub transactions: Vec<Transaction>,
}

#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub balance: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct SendMoneyRequest {
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub amount: Option<i64>,
    pub message: Option<String>,
    pub accepted: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ResolveTransactionRequest {
    pub accepted: Option<bool>,
}
