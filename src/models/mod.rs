//! Core data model for the upload gallery.
//!
//! A single entity, [`file_record::FileRecord`], maps to the `files` table via
//! `sqlx::FromRow` and serializes as JSON via `serde`.

pub mod file_record;
