//! Error types for blob operations.

use thiserror::Error;

/// Errors that can occur while storing or reading blobs.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Bucket or key would escape the store root or is empty.
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    /// No blob at the given location.
    #[error("blob not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Filesystem failure.
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for blob operations.
pub type Result<T> = std::result::Result<T, BlobError>;
