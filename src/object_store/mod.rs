mod gcs;
mod local;

pub use gcs::GcsStore;
pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over object storage backends. Objects live under a
/// (bucket, key) pair; keys may contain slashes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, ObjectStoreError>;
    /// Stable browser-reachable URL for an object. Does not check that the
    /// object exists.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
