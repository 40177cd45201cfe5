//! Database error types.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Table name outside the entity catalog.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Rejected input, including store constraint violations.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DatabaseError {
    /// Convert a statement failure, turning constraint violations into
    /// [`DatabaseError::Validation`].
    pub(crate) fn from_statement(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return DatabaseError::Validation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
