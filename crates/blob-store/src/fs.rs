//! Filesystem-backed blob store.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{BlobError, Result};
use crate::key::{ensure_bucket, ensure_key, public_url};
use crate::trait_def::{Blob, BlobStore};

/// Stores blobs as plain files under `root/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        ensure_bucket(bucket)?;
        ensure_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<String> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write aside and rename so readers never see a partial file.
        let temp_path = path.with_extension(format!("{}.uploading", Uuid::new_v4().simple()));
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(bucket, key, size = bytes.len(), "Stored blob");
        Ok(public_url(bucket, key))
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Blob> {
        let path = self.object_path(bucket, key)?;
        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => BlobError::Io(e),
        })?;

        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Blob {
            bytes: Bytes::from(data),
            content_type,
        })
    }
}
