//! Upload gallery service: files go to a managed object-storage provider,
//! their metadata into SQLite, and a small REST API plus a single-page
//! browser client sit on top.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
