//! Edge-function style routes: chat actions and support requests.

use axum::extract::State;
use axum::Json;
use chat_router::{ActionRequest, DispatchResponse};
use database::gateway::{self, Submission};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::auth::{CurrentPrincipal, MaybePrincipal};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Dispatch a billable chat action.
pub async fn chat_router(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(request): ApiJson<ActionRequest>,
) -> Result<Json<DispatchResponse>> {
    let response = state.dispatcher.dispatch(&principal, request).await?;
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
pub struct SupportRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Record a support request. Anonymous requests are acknowledged but not stored.
pub async fn contact_support(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    ApiJson(req): ApiJson<SupportRequest>,
) -> Result<Json<Value>> {
    if let Some(principal) = principal {
        let subject = req
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Support".to_string());
        let mut item = Map::new();
        item.insert("subject".into(), Value::String(subject));
        item.insert("message".into(), Value::String(req.message.unwrap_or_default()));

        gateway::create(state.db.pool(), &principal, "help_requests", Submission::One(item)).await?;
        tracing::info!(user_id = %principal.id, "Support request stored");
    }

    Ok(Json(json!({ "ok": true })))
}
