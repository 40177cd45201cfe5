//! Bucketed blob storage for uploaded files.
//!
//! Blobs live under `<bucket>/<key>` and are served back from
//! `/storage/<bucket>/public/<key>`. Keys are validated so that no blob
//! can be written or read outside its bucket.

mod error;
mod fs;
mod key;
mod trait_def;

pub use error::{BlobError, Result};
pub use fs::FsBlobStore;
pub use key::{ensure_bucket, ensure_key, public_url};
pub use trait_def::{Blob, BlobStore};
