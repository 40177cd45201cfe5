//! Local backend server.

use std::sync::Arc;

use assistant::EchoAssistant;
use blob_store::FsBlobStore;
use database::Database;
use local_backend::{app, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting local backend");

    // Connect to database
    let db = Database::connect_with_pool_size(&config.database_url, config.pool_size).await?;
    db.migrate().await?;

    // Blob storage
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let blobs = Arc::new(FsBlobStore::new(&config.upload_dir));

    // Build application state
    let assistant = Arc::new(EchoAssistant::new());
    let state = AppState::new(db, assistant, blobs);

    // Build router
    let app = app(state, config.frontend_origin.clone());

    // Start server
    info!(addr = %config.addr, upload_dir = %config.upload_dir.display(), "Local backend listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
