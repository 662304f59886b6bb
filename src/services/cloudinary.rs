//! Cloudinary-style upload API client.
//!
//! Uploads are signed requests: the parameters sent alongside the file are
//! sorted by name, joined as `k=v&k=v`, suffixed with the API secret and
//! hashed with SHA-1. The ping endpoint uses HTTP basic auth instead.

use crate::{
    config::{StorageConfig, StorageCredentials},
    services::object_storage::{
        ObjectStorage, ObjectStorageError, ObjectStorageResult, StoredObject, UploadRequest,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Body, Client, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

/// Upload path segment that lets the provider detect image/video/raw itself.
const AUTO_RESOURCE_TYPE: &str = "auto";

#[derive(Clone)]
pub struct CloudinaryClient {
    http: Client,
    api_base: String,
    credentials: Option<StorageCredentials>,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct PingResponse {
    status: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ProviderMessage,
}

#[derive(Deserialize)]
struct ProviderMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            http: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials: config.credentials(),
        }
    }

    fn credentials(&self) -> ObjectStorageResult<&StorageCredentials> {
        self.credentials
            .as_ref()
            .ok_or(ObjectStorageError::NotConfigured)
    }

    fn endpoint(&self, creds: &StorageCredentials, path: &str) -> String {
        format!("{}/v1_1/{}/{}", self.api_base, creds.cloud_name, path)
    }
}

#[async_trait]
impl ObjectStorage for CloudinaryClient {
    async fn ping(&self) -> ObjectStorageResult<()> {
        let creds = self.credentials()?;
        let response = self
            .http
            .get(self.endpoint(creds, "ping"))
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(provider_error(status, &text));
        }

        let ping: PingResponse = serde_json::from_str(&text).map_err(|err| {
            ObjectStorageError::Provider(format!("unexpected ping response: {}", err))
        })?;
        if ping.status != "ok" {
            return Err(ObjectStorageError::Provider(format!(
                "unexpected ping status `{}`",
                ping.status
            )));
        }
        Ok(())
    }

    async fn upload_stream(&self, request: UploadRequest) -> ObjectStorageResult<StoredObject> {
        let creds = self.credentials()?;
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", request.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &creds.api_secret,
        );

        let length = request.data.len() as u64;
        let file_part =
            Part::stream_with_length(Body::from(request.data), length).file_name(request.filename);
        let form = Form::new()
            .part("file", file_part)
            .text("api_key", creds.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", request.folder)
            .text("signature", signature);

        let url = self.endpoint(creds, &format!("{}/upload", AUTO_RESOURCE_TYPE));
        debug!(%url, bytes = length, "uploading object");
        let response = self.http.post(url).multipart(form).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(provider_error(status, &text));
        }

        let uploaded: UploadResponse = serde_json::from_str(&text).map_err(|err| {
            ObjectStorageError::Provider(format!("unexpected upload response: {}", err))
        })?;
        Ok(StoredObject {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Compute the request signature for a set of API parameters.
///
/// Empty values are not part of the signed string.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn provider_error(status: StatusCode, body: &str) -> ObjectStorageError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ObjectStorageError::Provider(envelope.error.message),
        Err(_) => ObjectStorageError::Provider(format!("storage provider returned {}", status)),
    }
}
