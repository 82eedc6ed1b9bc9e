//! Object storage: the [`ObjectStore`] seam and its S3 implementation.
//!
//! The orchestrator and upload handlers talk to [`ObjectStore`] only, so
//! tests can swap in an in-memory fake. Production wires [`s3::S3Store`].

pub mod keys;
pub mod s3;

pub use s3::{S3Store, StorageConfig};

use bytes::Bytes;
use std::time::Duration;

/// Result of storing an object: the retrievable URL plus the storage key.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
    pub size: usize,
}

/// A listed object under a prefix.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
}

/// Errors from the object storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying store rejected or failed the request.
    #[error("Storage request failed: {0}")]
    Request(String),

    /// The requested object does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Abstraction over the external object store.
///
/// The synthesis provider requires URL-accessible inputs, so `put` always
/// returns a retrievable URL alongside the key.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, returning the retrievable URL and key.
    async fn put(
        &self,
        bytes: Bytes,
        key: &str,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Fetch an object's bytes by key.
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Produce a time-limited signed GET URL for a key.
    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String, StorageError>;

    /// List objects under a key prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Delete an object by key. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
