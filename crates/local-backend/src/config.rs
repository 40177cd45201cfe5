//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;

/// Backend server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum database pool connections.
    pub pool_size: u32,
    /// Root directory for uploaded blobs.
    pub upload_dir: PathBuf,
    /// Origin allowed to call the API with credentials.
    pub frontend_origin: HeaderValue,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BACKEND_ADDR` | Server bind address | `127.0.0.1:5000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:data.db?mode=rwc` |
    /// | `DATABASE_POOL_SIZE` | Max pool connections | `20` |
    /// | `UPLOAD_DIR` | Blob root directory | `uploads` |
    /// | `FRONTEND_ORIGIN` | CORS origin | `http://localhost:8080` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BACKEND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data.db?mode=rwc".to_string());

        let pool_size = match env::var("DATABASE_POOL_SIZE") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidPoolSize(raw))?,
            Err(_) => database::Database::DEFAULT_POOL_SIZE,
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let origin =
            env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let frontend_origin =
            HeaderValue::from_str(&origin).map_err(|_| ConfigError::InvalidOrigin(origin))?;

        Ok(Self {
            addr,
            database_url,
            pool_size,
            upload_dir,
            frontend_origin,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BACKEND_ADDR format")]
    InvalidAddr,

    #[error("Invalid DATABASE_POOL_SIZE: {0}")]
    InvalidPoolSize(String),

    #[error("Invalid FRONTEND_ORIGIN: {0}")]
    InvalidOrigin(String),
}
