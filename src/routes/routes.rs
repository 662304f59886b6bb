//! Defines routes for the upload gallery.
//!
//! ## Structure
//! - `GET    /`            — browser client
//! - `GET    /test`        — reachability probe
//! - `GET    /health`      — health status
//! - `POST   /upload`      — multipart upload (single `file` field)
//! - `GET    /files`       — list records, newest first
//! - `DELETE /files/{id}`  — delete a record (metadata only)

use crate::{
    handlers::{
        file_handlers::{delete_file, list_files, upload_file},
        health_handlers::{health, test_connection},
        ui_handlers::index,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the router for all endpoints.
///
/// `max_upload_bytes` bounds the buffered upload body; anything larger is
/// rejected while the body is being read, before storage is involved.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/test", get(test_connection))
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/files", get(list_files))
        .route("/files/{id}", delete(delete_file))
}

/// Full application: routes, shared state, request tracing and open CORS.
pub fn app(state: AppState) -> Router {
    routes(state.uploads.max_bytes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
