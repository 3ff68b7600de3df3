use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::Instant;

use port_service::adapters::{router, InMemoryPortRepository, InMemoryStore, PortHandlers};
use port_service::config::AppConfig;
use port_service::shutdown::{run_cleanup, shutdown_signal, CleanupFuture};
use port_service::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    telemetry::init(&config.server).context("failed to initialize tracing")?;

    let addr = config.server.socket_addr()?;
    let store = InMemoryStore::new();
    let repository = Arc::new(InMemoryPortRepository::with_store(store.clone()));

    // Flipped on shutdown; uploads in flight observe it and stop.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handlers = PortHandlers::new(repository, config.upload.max_body_bytes, shutdown_rx);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, environment = ?config.server.environment, "Port service listening");

    axum::serve(listener, router(handlers))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("server error")?;

    tracing::info!("Server stopped, releasing resources");

    let timeout = config.server.shutdown_timeout();
    let deadline = Instant::now() + timeout;
    let store_shutdown: CleanupFuture = Box::pin(async move {
        store.shutdown(deadline).await.map_err(|e| e.to_string())
    });

    let reports = run_cleanup(vec![("store", store_shutdown)], timeout).await;
    tracing::info!(steps = reports.len(), "Shutdown complete");

    Ok(())
}
