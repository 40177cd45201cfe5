//! Ledger RPC routes.

use axum::extract::State;
use axum::Json;
use database::credits::{self, Counter, CounterGroup, DebitOutcome};
use database::{time, ActionCredits, DocumentCredits};
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentPrincipal;
use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    #[serde(default)]
    pub kind: Option<String>,
}

fn document_counter(kind: Option<&str>) -> Result<Counter> {
    match kind {
        Some("bill") => Ok(Counter::OcrBill),
        Some("bank") => Ok(Counter::OcrBank),
        _ => Err(ApiError::BadRequest("kind must be \"bill\" or \"bank\"".to_string())),
    }
}

/// Roll the action counters over if the month changed.
pub async fn reset_monthly_credits(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<ActionCredits>> {
    let today = time::today();
    let mut tx = state.db.pool().begin().await?;
    credits::ensure(&mut tx, &principal.id, today).await?;
    credits::rollover_if_needed(&mut tx, &principal.id, CounterGroup::Action, today).await?;
    let ledger = credits::get(&mut tx, &principal.id).await?;
    tx.commit().await?;

    Ok(Json(ledger.action_credits()))
}

/// Roll the document counters over if the month changed.
pub async fn reset_monthly_ocr_credits(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<DocumentCredits>> {
    let today = time::today();
    let mut tx = state.db.pool().begin().await?;
    credits::ensure(&mut tx, &principal.id, today).await?;
    credits::rollover_if_needed(&mut tx, &principal.id, CounterGroup::Document, today).await?;
    let ledger = credits::get(&mut tx, &principal.id).await?;
    tx.commit().await?;

    Ok(Json(ledger.document_credits()))
}

/// Spend one document-extraction credit.
pub async fn consume_ocr_credit(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(req): ApiJson<ConsumeRequest>,
) -> Result<Json<DocumentCredits>> {
    let counter = document_counter(req.kind.as_deref())?;
    let today = time::today();

    let mut tx = state.db.pool().begin().await?;
    credits::ensure(&mut tx, &principal.id, today).await?;
    credits::rollover_if_needed(&mut tx, &principal.id, counter.group(), today).await?;
    let outcome = credits::try_debit(&mut tx, &principal.id, counter, 1).await?;
    let ledger = credits::get(&mut tx, &principal.id).await?;
    tx.commit().await?;

    match outcome {
        DebitOutcome::Debited => Ok(Json(ledger.document_credits())),
        DebitOutcome::InsufficientCredits => {
            info!(user_id = %principal.id, counter = counter.column_name(), "Document credits exhausted");
            Err(ApiError::InsufficientCredits(serde_json::json!(ledger.document_credits())))
        }
    }
}
