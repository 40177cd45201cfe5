//! Bucket and key validation.

use crate::error::{BlobError, Result};

/// A bucket is a single non-empty path segment.
pub fn ensure_bucket(bucket: &str) -> Result<()> {
    if bucket.is_empty() || bucket == "." || bucket.contains(['/', '\\']) || bucket.contains("..") {
        return Err(BlobError::InvalidPath(format!("bad bucket: {bucket:?}")));
    }
    Ok(())
}

/// A key is a relative path inside its bucket.
pub fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() || key.ends_with('/') {
        return Err(BlobError::InvalidPath("key is empty".into()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(BlobError::InvalidPath(format!("bad key: {key:?}")));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == ".") {
        return Err(BlobError::InvalidPath(format!("bad key: {key:?}")));
    }
    Ok(())
}

/// Public URL a stored blob is served from.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("/storage/{bucket}/public/{key}")
}
