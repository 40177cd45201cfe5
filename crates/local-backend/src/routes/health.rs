//! Banner and health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
}

#[derive(Serialize)]
pub struct Banner {
    pub ok: bool,
    pub message: String,
}

/// Root banner, naming the configured assistant.
pub async fn root(State(state): State<AppState>) -> Json<Banner> {
    Json(Banner {
        ok: true,
        message: format!(
            "Local backend running with {}",
            state.dispatcher.assistant_name()
        ),
    })
}

/// Health check endpoint.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}
