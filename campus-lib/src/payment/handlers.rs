use crate::error::HandlerError;
use crate::payment::{
    transfers, CreateUserRequest, ResolveTransactionRequest, SendMoneyRequest, TransactionList,
    UserList,
};
use crate::tracing::record_entity;
use actix_web::{web, HttpResponse, Responder};
use campus_repo::transaction_repo::TransactionRepo;
use campus_repo::user_repo::UserRepo;
use chrono::Utc;
use std::sync::Arc;
use tracing_actix_web::RootSpan;

#[get("/users/")]
pub async fn get_all_users(
    user_repo: web::Data<Arc<dyn UserRepo>>,
) -> Result<impl Responder, HandlerError> {
    let users = user_repo.get_all_users().await?;
    Ok(HttpResponse::Ok().json(UserList { users }))
}

#[post("/users/")]
pub async fn create_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    new_user: web::Json<CreateUserRequest>,
) -> Result<impl Responder, HandlerError> {
    let user = transfers::create_user(&***user_repo, new_user.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/users/{user_id}/")]
pub async fn get_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    record_entity(&root_span, user_id);
    let user = transfers::user_details(&***user_repo, &***transaction_repo, user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}/")]
pub async fn delete_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    record_entity(&root_span, user_id);
    let user = transfers::delete_user(&***user_repo, &***transaction_repo, user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/trans/")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
) -> Result<impl Responder, HandlerError> {
    let transactions = transaction_repo.get_all_transactions().await?;
    Ok(HttpResponse::Ok().json(TransactionList { transactions }))
}

#[post("/transactions/")]
pub async fn send_money(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    request: web::Json<SendMoneyRequest>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transfers::send_money(
        &***user_repo,
        &***transaction_repo,
        request.into_inner(),
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[post("/transactions/{transaction_id}/")]
pub async fn resolve_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    transaction_id: web::Path<i64>,
    request: web::Json<ResolveTransactionRequest>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let transaction_id = transaction_id.into_inner();
    record_entity(&root_span, transaction_id);
    let transaction = transfers::resolve_transaction(
        &***transaction_repo,
        transaction_id,
        request.into_inner(),
        Utc::now(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
