//! Application state shared across handlers.

use std::sync::Arc;

use assistant::Assistant;
use blob_store::BlobStore;
use chat_router::Dispatcher;
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Chat action dispatcher.
    pub dispatcher: Dispatcher,
    /// Uploaded file storage.
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, assistant: Arc<dyn Assistant>, blobs: Arc<dyn BlobStore>) -> Self {
        let dispatcher = Dispatcher::new(db.pool().clone(), assistant);
        Self {
            db,
            dispatcher,
            blobs,
        }
    }
}
