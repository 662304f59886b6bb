//! Upload pipeline: buffered file -> remote storage -> metadata record.
//!
//! The two external calls are not wrapped in a transaction. A storage
//! failure means no record is written; a metadata failure after a successful
//! storage call leaves the remote object behind with nothing pointing at it.

use crate::{
    models::file_record::{FileRecord, NewFileRecord},
    services::{
        metadata_store::{MetadataError, MetadataStore},
        object_storage::{ObjectStorage, ObjectStorageError, UploadRequest},
    },
};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Storage(#[from] ObjectStorageError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    store: MetadataStore,
    folder: String,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        store: MetadataStore,
        folder: impl Into<String>,
        max_bytes: usize,
    ) -> Self {
        Self {
            storage,
            store,
            folder: folder.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Run one upload end to end. Any failure aborts the whole pipeline.
    pub async fn upload(
        &self,
        filename: String,
        data: Option<Bytes>,
    ) -> Result<FileRecord, UploadError> {
        let data = data.ok_or(UploadError::MissingFile)?;
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let size = data.len();
        let stored = self
            .storage
            .upload_stream(UploadRequest {
                data,
                filename: filename.clone(),
                folder: self.folder.clone(),
            })
            .await
            .inspect_err(|err| error!(%filename, "storage upload failed: {}", err))?;

        let record = self
            .store
            .create(NewFileRecord::new(filename, stored.url))
            .await
            .inspect_err(|err| {
                error!(
                    public_id = %stored.public_id,
                    "metadata write failed after storage upload: {}", err
                )
            })?;

        info!(id = %record.id, filename = %record.filename, bytes = size, "file uploaded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        metadata_store::tests::memory_store,
        object_storage::{ObjectStorageResult, StoredObject},
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls and answers with a canned result.
    struct ScriptedStorage {
        fail_with: Option<String>,
        calls: Mutex<Vec<UploadRequest>>,
    }

    impl ScriptedStorage {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                fail_with: Some(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObjectStorage for ScriptedStorage {
        async fn ping(&self) -> ObjectStorageResult<()> {
            Ok(())
        }

        async fn upload_stream(&self, request: UploadRequest) -> ObjectStorageResult<StoredObject> {
            let name = request.filename.clone();
            self.calls.lock().unwrap().push(request);
            match &self.fail_with {
                Some(message) => Err(ObjectStorageError::Provider(message.clone())),
                None => Ok(StoredObject {
                    url: format!("https://res.example/{}", name),
                    public_id: name,
                }),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn successful_upload_persists_one_record() {
        let storage = ScriptedStorage::ok();
        let store = memory_store().await;
        let service = UploadService::new(storage.clone(), store.clone(), "gallery", 1024);

        let record = service
            .upload("dog.jpg".into(), Some(Bytes::from_static(b"jpeg")))
            .await
            .unwrap();

        assert_eq!(record.filename, "dog.jpg");
        assert_eq!(record.storage_url, "https://res.example/dog.jpg");
        assert_eq!(store.find_all().await.unwrap(), vec![record]);

        let calls = storage.calls.lock().unwrap();
        assert_eq!(calls[0].folder, "gallery");
    }

    #[tokio::test]
    async fn missing_buffer_is_rejected_before_storage() {
        let storage = ScriptedStorage::ok();
        let store = memory_store().await;
        let service = UploadService::new(storage.clone(), store.clone(), "gallery", 1024);

        let err = service.upload("x".into(), None).await.unwrap_err();
        assert!(matches!(err, UploadError::MissingFile));
        assert_eq!(storage.call_count(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_buffer_never_reaches_storage() {
        let storage = ScriptedStorage::ok();
        let store = memory_store().await;
        let service = UploadService::new(storage.clone(), store.clone(), "gallery", 4);

        let err = service
            .upload("big.bin".into(), Some(Bytes::from_static(b"12345")))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 4 }));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn storage_failure_leaves_no_record() {
        let storage = ScriptedStorage::failing("Invalid Signature");
        let store = memory_store().await;
        let service = UploadService::new(storage.clone(), store.clone(), "gallery", 1024);

        let err = service
            .upload("cat.png".into(), Some(Bytes::from_static(b"png")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Signature");
        assert_eq!(storage.call_count(), 1);
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
