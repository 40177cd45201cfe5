//! SQLite persistence layer for the local backend.
//!
//! This crate owns the store: principals and sessions, the closed entity
//! catalog behind the generic resource gateway, the per-principal credit
//! ledger, and conversation turns. Everything runs on SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{gateway, user, Database};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:data.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a principal and a chat owned by it
//!     let alice = user::create_user(db.pool(), "alice@example.com", "$argon2id$...").await?;
//!     let item = json!({ "title": "Groceries" });
//!     let submission = serde_json::from_value(item)?;
//!     gateway::create(db.pool(), &alice.principal(), "chats", submission).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod catalog;
pub mod credits;
pub mod error;
pub mod gateway;
pub mod models;
pub mod query;
pub mod session;
pub mod time;
pub mod turn;
pub mod user;
pub mod validation;

pub use credits::{Counter, CounterGroup, DebitOutcome};
pub use error::{DatabaseError, Result};
pub use models::{
    ActionCredits, CreditLedger, DocumentCredits, Plan, Principal, Role, Turn, TurnContent, User,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
