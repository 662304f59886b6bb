//! Scripted in-process stand-in for the remote storage provider.

use async_trait::async_trait;
use file_vault::services::object_storage::{
    ObjectStorage, ObjectStorageError, ObjectStorageResult, StoredObject, UploadRequest,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub struct ScriptedStorage {
    fail_with: Option<String>,
    uploads: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedStorage {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            uploads: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.to_string()),
            uploads: AtomicUsize::new(0),
        })
    }

    /// Number of upload attempts that reached the provider.
    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for ScriptedStorage {
    async fn ping(&self) -> ObjectStorageResult<()> {
        Ok(())
    }

    async fn upload_stream(&self, request: UploadRequest) -> ObjectStorageResult<StoredObject> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(ObjectStorageError::Provider(message.clone()));
        }
        Ok(StoredObject {
            url: format!(
                "https://res.example/{}/{}-{}",
                request.folder, n, request.filename
            ),
            public_id: format!("{}/{}", request.folder, n),
        })
    }

    fn is_configured(&self) -> bool {
        self.fail_with.is_none()
    }
}
