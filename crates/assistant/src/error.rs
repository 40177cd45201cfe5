//! Error types for assistant operations.

use thiserror::Error;

/// Errors that can occur while producing a reply.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The assistant is temporarily unavailable.
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    /// The prompt could not be answered.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}
