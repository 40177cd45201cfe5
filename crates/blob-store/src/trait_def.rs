//! The BlobStore trait definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Bytes,
    /// MIME type guessed from the key's extension.
    pub content_type: String,
}

/// Bucketed blob storage.
///
/// Writes are independent of any database transaction.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `bucket/key`, replacing any existing blob, and return
    /// its public URL.
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<String>;

    /// Read the blob at `bucket/key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Blob>;
}
