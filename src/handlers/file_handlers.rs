//! HTTP handlers for uploading, listing and deleting file records.
//! The upload body is buffered in memory (bounded by the route's body limit)
//! and handed to `UploadService`.

use crate::{
    errors::AppError, models::file_record::FileRecord, services::upload_service::UploadError,
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Multipart field the file must be sent under.
pub const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub file: FileRecord,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: Uuid,
}

/// `POST /upload` — accepts exactly one file under the `file` field.
/// Text fields are ignored. A body that is not multipart at all carries no
/// file and is answered like a missing file.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("upload body is not multipart: {}", rejection.body_text());
        AppError::from(UploadError::MissingFile)
    })?;
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let name = field.name().unwrap_or_default();
        if name != FILE_FIELD {
            return Err(AppError::bad_request(format!("Unexpected field `{}`", name)));
        }
        if upload.is_some() {
            return Err(AppError::bad_request(
                "Only one file may be uploaded per request",
            ));
        }

        let data = field.bytes().await?;
        upload = Some((filename, data));
    }

    let (filename, data) = match upload {
        Some((filename, data)) => (filename, Some(data)),
        None => (String::new(), None),
    };
    let record = state.uploads.upload(filename, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully",
            file: record,
        }),
    ))
}

/// `GET /files` — every record, newest first.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileRecord>>, AppError> {
    Ok(Json(state.store.find_all().await?))
}

/// `DELETE /files/{id}` — removes the metadata row only. The object at the
/// storage provider is left untouched.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::not_found("File not found"))?;

    let record = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("File not found"))?;

    if !state.store.delete_by_id(record.id).await? {
        return Err(AppError::not_found("File not found"));
    }

    info!(%id, url = %record.storage_url, "file record deleted; remote object retained");
    Ok(Json(DeleteResponse {
        message: "File deleted successfully",
        id,
    }))
}
