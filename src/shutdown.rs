//! Graceful shutdown.
//!
//! [`shutdown_signal`] waits for the process to be asked to stop;
//! [`run_cleanup`] then releases resources, each step under a time limit.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::future::join_all;

/// A named cleanup step.
pub type CleanupFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// How one cleanup step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Completed,
    Failed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub name: &'static str,
    pub outcome: CleanupOutcome,
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C only on non-Unix targets).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Run every cleanup step concurrently, each bounded by `timeout`.
///
/// Reports come back in the order the steps were given.
pub async fn run_cleanup(
    operations: Vec<(&'static str, CleanupFuture)>,
    timeout: Duration,
) -> Vec<CleanupReport> {
    let steps = operations.into_iter().map(|(name, operation)| async move {
        let outcome = match tokio::time::timeout(timeout, operation).await {
            Ok(Ok(())) => {
                tracing::info!(operation = name, "Cleanup completed");
                CleanupOutcome::Completed
            }
            Ok(Err(e)) => {
                tracing::error!(operation = name, error = %e, "Cleanup failed");
                CleanupOutcome::Failed(e)
            }
            Err(_) => {
                tracing::warn!(operation = name, ?timeout, "Cleanup timed out");
                CleanupOutcome::TimedOut
            }
        };
        CleanupReport { name, outcome }
    });

    join_all(steps).await
}
