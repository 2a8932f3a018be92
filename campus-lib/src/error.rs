use actix_web::body::BoxBody;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use campus_repo::course_repo::CourseRepoError;
use campus_repo::transaction_repo::TransactionRepoError;
use campus_repo::user_repo::UserRepoError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can report. Rendered as `{"error": <message>}`.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// A referenced row is missing. Reported as a bad request rather than 404.
    #[error("{0}")]
    UnknownReference(String),
    #[error("insufficient balance!")]
    InsufficientFunds,
    #[error("cannot change transaction's accepted field")]
    ImmutableState,
    #[error("{0}")]
    Creation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::UnknownReference(_) => StatusCode::BAD_REQUEST,
            HandlerError::InsufficientFunds => StatusCode::FORBIDDEN,
            HandlerError::ImmutableState => StatusCode::FORBIDDEN,
            HandlerError::Creation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let message = match self {
            HandlerError::Internal(e) => {
                error!(error = ?e, "Internal error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<CourseRepoError> for HandlerError {
    fn from(e: CourseRepoError) -> Self {
        match e {
            CourseRepoError::CourseNotFound(_) => {
                HandlerError::NotFound("course not found".to_string())
            }
            CourseRepoError::AssignmentNotFound(_) => {
                HandlerError::NotFound("assignment not found".to_string())
            }
            CourseRepoError::UserNotFound(_) => {
                HandlerError::NotFound("user not found".to_string())
            }
            CourseRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<UserRepoError> for HandlerError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::UserNotFound(_) => HandlerError::NotFound("user not found!".to_string()),
            UserRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<TransactionRepoError> for HandlerError {
    fn from(e: TransactionRepoError) -> Self {
        match e {
            TransactionRepoError::TransactionNotFound(_) => {
                HandlerError::UnknownReference("Could not find transaction.".to_string())
            }
            TransactionRepoError::UserNotFound(_) => {
                HandlerError::UnknownReference("user not found!".to_string())
            }
            TransactionRepoError::InsufficientFunds { .. } => HandlerError::InsufficientFunds,
            TransactionRepoError::AlreadyResolved(_) => HandlerError::ImmutableState,
            TransactionRepoError::BalanceOverflow { .. } => {
                HandlerError::Validation("amount exceeds the receiver's balance limit".to_string())
            }
            TransactionRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

/// Malformed or missing JSON bodies get the same error envelope as handler failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        error!(req_path = req.path(), %err);
        let error_body = match &err {
            JsonPayloadError::Deserialize(deserialize_err) => json!({
                "error": "Unable to parse JSON payload",
                "detail": format!("{}", deserialize_err),
            }),
            _ => json!({ "error": format!("{}", err) }),
        };
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest()
                .content_type("application/json")
                .body(error_body.to_string()),
        )
        .into()
    })
}
