//! Shared test harness: in-memory SQLite plus a scripted storage provider.

pub mod storage;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use file_vault::{routes::routes::app, services::metadata_store::MetadataStore, state::AppState};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use storage::ScriptedStorage;
use tower::ServiceExt;

pub const BOUNDARY: &str = "file-vault-test-boundary";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: Router,
    pub store: MetadataStore,
    pub storage: Arc<ScriptedStorage>,
}

#[allow(dead_code)]
impl TestServer {
    pub async fn new(max_upload_bytes: usize) -> Self {
        Self::with_storage(ScriptedStorage::ok(), max_upload_bytes).await
    }

    pub async fn with_storage(storage: Arc<ScriptedStorage>, max_upload_bytes: usize) -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        let store = MetadataStore::new(Arc::new(pool));
        store.run_migrations().await.expect("Failed to apply schema");

        let state = AppState::new(store.clone(), storage.clone(), "test-folder", max_upload_bytes);
        Self {
            router: app(state),
            store,
            storage,
        }
    }

    /// Send a request and decode the JSON body (Null when empty or not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Upload one file under `field`.
    pub async fn upload(&self, field: &str, filename: &str, data: &[u8]) -> (StatusCode, Value) {
        let body = multipart_body(&[Part::File {
            field,
            filename,
            data,
        }]);
        self.send(multipart_request(body)).await
    }
}

#[allow(dead_code)]
pub enum Part<'a> {
    File {
        field: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    Text {
        field: &'a str,
        value: &'a str,
    },
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                field,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        field, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                        field, value
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::post("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
