//! Represents an uploaded file whose bytes live at the remote storage provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata row for one successfully uploaded file.
///
/// A record only exists once the provider accepted the upload, so
/// `storage_url` is always populated. Records are never updated in place.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Store-assigned identifier.
    pub id: Uuid,

    /// Original filename as sent by the client.
    pub filename: String,

    /// Secure URL returned by the storage provider.
    #[serde(rename = "url")]
    pub storage_url: String,

    /// Server time at which the record was created.
    pub uploaded_at: DateTime<Utc>,
}

/// A record that has not been persisted yet (no id).
#[derive(Clone, Debug)]
pub struct NewFileRecord {
    pub filename: String,
    pub storage_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl NewFileRecord {
    /// Stamp a new record with the current time.
    pub fn new(filename: impl Into<String>, storage_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            storage_url: storage_url.into(),
            uploaded_at: Utc::now(),
        }
    }
}
