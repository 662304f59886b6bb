//! Shared handles passed to every request handler.

use crate::services::{
    metadata_store::MetadataStore, object_storage::ObjectStorage, upload_service::UploadService,
};
use std::sync::Arc;

/// Cheap to clone: every field is a handle to shared state.
#[derive(Clone)]
pub struct AppState {
    pub store: MetadataStore,
    pub storage: Arc<dyn ObjectStorage>,
    pub uploads: UploadService,
}

impl AppState {
    pub fn new(
        store: MetadataStore,
        storage: Arc<dyn ObjectStorage>,
        folder: impl Into<String>,
        max_upload_bytes: usize,
    ) -> Self {
        let uploads = UploadService::new(storage.clone(), store.clone(), folder, max_upload_bytes);
        Self {
            store,
            storage,
            uploads,
        }
    }

    pub fn storage_configured(&self) -> bool {
        self.storage.is_configured()
    }
}
