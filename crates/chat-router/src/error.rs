//! Error types for action dispatch.

use assistant::AssistantError;
use database::{ActionCredits, DatabaseError};
use thiserror::Error;

use crate::request::Tier;

/// Errors that can end a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required request field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The action kind is not one the dispatcher knows.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// The tier's counter is exhausted. Carries the counters after the check.
    #[error("insufficient credits for {tier}")]
    InsufficientCredits { tier: Tier, credits: ActionCredits },

    /// The referenced conversation does not exist or is not the caller's.
    #[error("conversation not found: {0}")]
    NotFound(String),

    /// The assistant failed after the debit was taken.
    #[error("assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// Store failure. Nothing from the request was kept.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        DispatchError::Database(DatabaseError::Sqlx(err))
    }
}
