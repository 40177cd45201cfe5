//! Error types for the HTTP surface.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blob_store::BlobError;
use chat_router::DispatchError;
use database::DatabaseError;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors a handler can return. Each maps to one status code and a
/// `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No resolvable principal.
    #[error("unauthorized")]
    Unauthorized,

    /// Table name outside the entity catalog.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A debit would overdraw a counter. Carries the current counters.
    #[error("insufficient credits")]
    InsufficientCredits(Value),

    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// Invalid input. The message is returned verbatim.
    #[error("{0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UnknownResource(table) => ApiError::UnknownTable(table),
            DatabaseError::Validation(msg) => ApiError::BadRequest(msg),
            DatabaseError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} {id}")),
            DatabaseError::AlreadyExists { entity, id } => {
                ApiError::BadRequest(format!("{entity} already exists: {id}"))
            }
            other => ApiError::Database(other),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => ApiError::BadRequest(msg),
            DispatchError::UnsupportedAction(action) => ApiError::UnsupportedAction(action),
            DispatchError::InsufficientCredits { credits, .. } => {
                ApiError::InsufficientCredits(json!(credits))
            }
            DispatchError::NotFound(what) => ApiError::NotFound(what),
            DispatchError::Assistant(e) => ApiError::Internal(e.to_string()),
            DispatchError::Database(e) => e.into(),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidPath(msg) => ApiError::BadRequest(msg),
            BlobError::NotFound { bucket, key } => ApiError::NotFound(format!("{bucket}/{key}")),
            BlobError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(DatabaseError::Sqlx(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })),
            ApiError::UnknownTable(table) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "unknown_table", "table": table }),
            ),
            ApiError::InsufficientCredits(credits) => (
                StatusCode::PAYMENT_REQUIRED,
                json!({ "error": "insufficient_credits", "credits": credits }),
            ),
            ApiError::UnsupportedAction(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "unsupported_action" }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": what }),
            ),
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal_error" }),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal_error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
