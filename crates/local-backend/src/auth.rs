//! Session resolution for incoming requests.
//!
//! A session token is taken from `Authorization: Bearer <token>` or, failing
//! that, from the `session` cookie.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use database::{account, session, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Extract the session token from request headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that stores `token`.
pub fn session_cookie(token: &str) -> HeaderValue {
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("session=; Path=/"))
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

async fn resolve_principal(parts: &Parts, state: &AppState) -> Result<Option<Principal>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };

    let Some(principal) = session::resolve(state.db.pool(), &token).await? else {
        return Ok(None);
    };

    account::ensure_account(state.db.pool(), &principal).await?;
    Ok(Some(principal))
}

/// The authenticated principal. Rejects with 401 when absent.
///
/// Resolving also bootstraps the principal's profile and ledger entry.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_principal(parts, state)
            .await?
            .map(CurrentPrincipal)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The principal if the request carries a valid session.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(resolve_principal(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=tok; x=1"));
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer one"));
        headers.insert(COOKIE, HeaderValue::from_static("session=two"));
        assert_eq!(session_token(&headers).as_deref(), Some("one"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert!(session_token(&headers).is_none());
        assert!(session_token(&HeaderMap::new()).is_none());
    }
}
