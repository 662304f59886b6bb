//! Boundary to the remote object-storage provider.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("storage credentials are not configured")]
    NotConfigured,
    /// Error message reported by the provider, passed through unchanged.
    #[error("{0}")]
    Provider(String),
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

/// A fully buffered upload.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub data: Bytes,
    pub filename: String,
    pub folder: String,
}

/// What the provider hands back for a stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

/// Remote storage provider.
///
/// Every call is a single attempt: no retry, no backoff, no timeout beyond
/// whatever the underlying HTTP client applies.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Check credentials and connectivity.
    async fn ping(&self) -> ObjectStorageResult<()>;

    /// Send a buffered object to the provider.
    async fn upload_stream(&self, request: UploadRequest) -> ObjectStorageResult<StoredObject>;

    /// Whether credentials are present (says nothing about their validity).
    fn is_configured(&self) -> bool;
}
