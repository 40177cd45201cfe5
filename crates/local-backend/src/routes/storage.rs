//! Blob upload and public download routes.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::CurrentPrincipal;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Store the multipart `file` part at the `path` part inside `bucket`.
pub async fn upload(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut file: Option<Bytes> = None;
    let mut path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file = Some(field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?);
            }
            Some("path") => {
                path = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?);
            }
            _ => {}
        }
    }

    let (Some(file), Some(path)) = (file, path.filter(|p| !p.is_empty())) else {
        return Err(ApiError::BadRequest("file_and_path_required".to_string()));
    };

    let size = file.len();
    let public_url = state.blobs.put(&bucket, &path, file).await?;
    info!(user_id = %principal.id, bucket = %bucket, path = %path, size, "Stored upload");

    Ok(Json(json!({ "path": path, "publicUrl": public_url })))
}

/// Serve a stored blob. No session required.
pub async fn public(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response> {
    let blob = state.blobs.get(&bucket, &path).await?;
    Ok(([(CONTENT_TYPE, blob.content_type)], Body::from(blob.bytes)).into_response())
}
