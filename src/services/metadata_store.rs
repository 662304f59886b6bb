//! MetadataStore: the `files` table holding one row per uploaded file.
//!
//! Only metadata lives here; the bytes themselves are owned by the remote
//! storage provider. No call in this module reaches out to that provider.

use crate::models::file_record::{FileRecord, NewFileRecord};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

const INIT_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Clone)]
pub struct MetadataStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl MetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Build a store over a lazily connecting pool.
    ///
    /// Nothing is opened here. A database that cannot be reached (including a
    /// directory that cannot be created) is logged, and the first query fails
    /// instead. Only an unparseable URL is an error.
    pub fn open_lazy(database_url: &str) -> MetadataResult<Self> {
        if let Err(err) = ensure_parent_dir(database_url) {
            error!(
                "Could not prepare database directory for {} ({}); file endpoints will fail until it exists",
                database_url, err
            );
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(options);
        Ok(Self::new(Arc::new(pool)))
    }

    /// Apply the embedded schema. Every statement is `IF NOT EXISTS`, so this
    /// is safe to run on each startup.
    pub async fn run_migrations(&self) -> MetadataResult<()> {
        let statements = INIT_SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        debug!("running {} schema statements", statements.len());
        for stmt in statements {
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }

    /// Persist a new record and return it with its assigned id.
    pub async fn create(&self, record: NewFileRecord) -> MetadataResult<FileRecord> {
        let created = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (id, filename, storage_url, uploaded_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, filename, storage_url, uploaded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.filename)
        .bind(&record.storage_url)
        .bind(record.uploaded_at)
        .fetch_one(&*self.db)
        .await?;

        debug!(id = %created.id, filename = %created.filename, "file record created");
        Ok(created)
    }

    /// All records, newest first. Equal timestamps fall back to insertion
    /// order, latest insert first.
    pub async fn find_all(&self) -> MetadataResult<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecord>(
            "SELECT id, filename, storage_url, uploaded_at
             FROM files
             ORDER BY uploaded_at DESC, rowid DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> MetadataResult<Option<FileRecord>> {
        let row = sqlx::query_as::<_, FileRecord>(
            "SELECT id, filename, storage_url, uploaded_at FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(row)
    }

    /// Remove the row for `id`. Returns `false` when nothing matched.
    pub async fn delete_by_id(&self, id: Uuid) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Create the directory holding a file-backed SQLite database, if missing.
fn ensure_parent_dir(database_url: &str) -> std::io::Result<()> {
    let db_path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created missing directory {:?}", parent);
        }
    }
    Ok(())
}
