//! # Graceful Shutdown

use std::future::Future;
use tracing::{error, info};

/// Resolves on ctrl-c
pub async fn shutdown_signal() {
    wait_for(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires.
///
/// If the listener could not be installed the error is logged and this
/// never resolves, so the server keeps running.
pub async fn wait_for<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
