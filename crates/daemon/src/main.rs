//! QPrint Server - Main Entry Point

mod logging;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use qprint_api_http::{AppState, HttpServer, HttpServerConfig, Services};
use qprint_core::application::{
    shutdown_channel, AccountService, BlobReaper, PrintLifecycle, QueueManager, ReportService,
    ShopDirectory, UploadService,
};
use qprint_core::port::{RandomCodeGenerator, SystemTimeProvider, TimeProvider};
use qprint_infra_sqlite::{
    create_pool, run_migrations, SqlitePrintJobRepository, SqliteSessionStore,
    SqliteUserRepository,
};
use qprint_infra_system::{Argon2PasswordHasher, LocalBlobStore, PdfPageCounter};

use crate::settings::ServerConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const REAPER_STOP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration, then logging
    let config = ServerConfig::load().context("Failed to load configuration")?;
    logging::init_logging()?;

    info!("QPrint server v{} starting...", VERSION);

    // 2. Storage
    if let Some(parent) = config.database_path().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    info!(database_url = %config.database_url, "Initializing database...");
    let pool = create_pool(&config.database_url, config.max_db_connections)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    let blob_store = Arc::new(LocalBlobStore::new(config.upload_dir.clone()));
    blob_store
        .ensure_root()
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;
    info!(upload_dir = %config.upload_dir.display(), "Blob store ready");

    // 3. DI wiring
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let job_repo = Arc::new(SqlitePrintJobRepository::new(pool.clone()));
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let session_store = Arc::new(SqliteSessionStore::new(pool.clone()));

    let purged = session_store
        .purge_expired(time_provider.now_millis())
        .await
        .context("Session cleanup failed")?;
    info!(purged, "Expired sessions removed");

    let queue = Arc::new(QueueManager::new(job_repo.clone(), job_repo.clone()));
    let accounts = Arc::new(AccountService::new(
        user_repo.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        session_store,
        time_provider.clone(),
        config.session_ttl(),
    ));
    let uploads = Arc::new(UploadService::new(
        queue.clone(),
        job_repo.clone(),
        user_repo.clone(),
        blob_store.clone(),
        Arc::new(PdfPageCounter),
        Arc::new(RandomCodeGenerator),
        time_provider.clone(),
        config.max_upload_bytes(),
    ));
    let lifecycle = Arc::new(PrintLifecycle::new(
        job_repo.clone(),
        job_repo.clone(),
        blob_store.clone(),
        time_provider.clone(),
    ));

    let state = AppState::new(
        Services {
            accounts,
            uploads,
            lifecycle,
            queue,
            shops: Arc::new(ShopDirectory::new(user_repo)),
            reports: Arc::new(ReportService::new(job_repo.clone())),
        },
        config.max_upload_bytes(),
    );

    // 4. Background blob reaper
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let reaper = BlobReaper::new(
        job_repo,
        blob_store,
        time_provider,
        config.reaper_interval(),
    );
    let reaper_handle = tokio::spawn(reaper.run(shutdown_rx));

    // 5. HTTP server
    let http_config = HttpServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    let mut server_handle =
        tokio::spawn(HttpServer::new(http_config, state).run(shutdown_tx.subscribe()));

    info!("Press Ctrl+C to shutdown");

    // 6. Wait for Ctrl+C, or for the server to exit on its own (e.g. bind failure)
    let served = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Exiting gracefully...");
            shutdown_tx.shutdown();
            server_handle.await
        }
        early = &mut server_handle => {
            shutdown_tx.shutdown();
            early
        }
    };

    // 7. Teardown
    if tokio::time::timeout(REAPER_STOP_TIMEOUT, reaper_handle)
        .await
        .is_err()
    {
        tracing::warn!("Blob reaper did not stop in time");
    }
    pool.close().await;

    served
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;
    info!("Shutdown complete.");
    Ok(())
}
