//! Reachability & health handlers.
//!
//! - GET /test   -> static "reachable" payload
//! - GET /health -> status, server time and storage-configuration flag
//!
//! Neither endpoint performs I/O; both always answer 200.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `GET /test`
pub async fn test_connection(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(TestResponse {
            message: "Server is reachable",
            storage_configured: state.storage_configured(),
        }),
    )
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            timestamp: Utc::now(),
            storage_configured: state.storage_configured(),
        }),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestResponse {
    message: &'static str,
    storage_configured: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    storage_configured: bool,
}
