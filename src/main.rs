use anyhow::Result;
use file_vault::{
    config::AppConfig,
    routes::routes::app,
    services::{
        cloudinary::CloudinaryClient, metadata_store::MetadataStore, object_storage::ObjectStorage,
    },
    state::AppState,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + migrate flag ---
    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!("no .env file loaded: {}", err);
    }
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting file-vault with config: {:?}", cfg);

    let missing = cfg.storage.missing_credentials();
    if !missing.is_empty() {
        tracing::warn!(
            "Storage credentials missing ({}); uploads will fail until they are set",
            missing.join(", ")
        );
    }

    // --- Initialize SQLite pool (lazy: an unreachable database must not stop startup) ---
    let store = MetadataStore::open_lazy(&cfg.database_url)?;

    // --- Handle migration mode ---
    if migrate {
        store.run_migrations().await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    match store.run_migrations().await {
        Ok(()) => tracing::info!("Metadata store ready"),
        Err(err) => tracing::error!(
            "Metadata store unavailable ({}); file endpoints will fail until it recovers",
            err
        ),
    }

    // --- Object storage; the ping result is informational only ---
    let storage: Arc<dyn ObjectStorage> = Arc::new(CloudinaryClient::new(&cfg.storage));
    let pinger = storage.clone();
    tokio::spawn(async move {
        match pinger.ping().await {
            Ok(()) => tracing::info!("Object storage reachable"),
            Err(err) => tracing::error!("Object storage ping failed: {}", err),
        }
    });

    // --- Build router ---
    let state = AppState::new(store, storage, cfg.storage.folder.clone(), cfg.max_upload_bytes);
    let router = app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
