//! Local HTTP backend.
//!
//! Serves accounts and sessions, the generic resource gateway over the
//! entity catalog, the credit ledger RPCs, credit-metered chat actions and
//! blob storage, all backed by a single SQLite database.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod password;
pub mod routes;
pub mod state;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// Build the full application: routes, request tracing and CORS for the
/// frontend origin.
pub fn app(state: AppState, frontend_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
