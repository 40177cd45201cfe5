//! Sign-up, sign-in and session routes.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::validation::{normalize_email, validate_email, validate_password};
use database::{account, session, user, DatabaseError, Principal};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::{clear_session_cookie, session_cookie, session_token, CurrentPrincipal, MaybePrincipal};
use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::password;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Body and cookie of a freshly opened session.
fn session_response(principal: &Principal, token: &str) -> Response {
    let body = json!({
        "user": principal,
        "session": { "access_token": token },
    });
    ([(SET_COOKIE, session_cookie(token))], Json(body)).into_response()
}

/// Create a principal and open a session for it.
pub async fn signup(State(state): State<AppState>, ApiJson(req): ApiJson<Credentials>) -> Result<Response> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("email and password required".to_string()));
    }
    validate_email(&email).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_password(&password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let pool = state.db.pool();
    let hash = password::hash_password(&password)?;
    let principal = match user::create_user(pool, &email, &hash).await {
        Ok(user) => user.principal(),
        Err(DatabaseError::AlreadyExists { .. }) => {
            return Err(ApiError::BadRequest("user already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    account::ensure_account(pool, &principal).await?;
    let token = session::create_session(pool, &principal.id).await?;

    info!(user_id = %principal.id, "User signed up");
    Ok(session_response(&principal, &token))
}

/// Open a session for existing credentials.
pub async fn signin(State(state): State<AppState>, ApiJson(req): ApiJson<Credentials>) -> Result<Response> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();
    let pool = state.db.pool();

    let user = match user::get_user_by_email(pool, &email).await? {
        Some(user) if password::verify_password(&password, &user.password_hash) => user,
        _ => return Err(ApiError::BadRequest("invalid_credentials".to_string())),
    };

    let principal = user.principal();
    account::ensure_account(pool, &principal).await?;
    let token = session::create_session(pool, &principal.id).await?;

    info!(user_id = %principal.id, "User signed in");
    Ok(session_response(&principal, &token))
}

/// Revoke the current session, if any, and clear the cookie.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = session_token(&headers) {
        session::delete_session(state.db.pool(), &token).await?;
    }

    Ok(([(SET_COOKIE, clear_session_cookie())], Json(json!({ "ok": true }))).into_response())
}

/// The signed-in principal, or `null`.
pub async fn get_session(MaybePrincipal(principal): MaybePrincipal) -> Json<serde_json::Value> {
    Json(json!({ "user": principal }))
}

/// Change the signed-in principal's password.
pub async fn update_user(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>> {
    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        validate_password(&password).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let hash = password::hash_password(&password)?;
        user::update_password_hash(state.db.pool(), &principal.id, &hash).await?;
        info!(user_id = %principal.id, "Password updated");
    }

    Ok(Json(json!({ "ok": true })))
}
