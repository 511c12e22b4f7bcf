//! Graceful shutdown trigger shared by the service binaries.

use tokio::signal;
use tracing::{error, info};

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// Returns when either signal is received. Pass to
/// `axum::serve(..).with_graceful_shutdown(..)`.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!(target: "common.shutdown", "Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!(target: "common.shutdown", "Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!(target: "common.shutdown", "Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!(target: "common.shutdown", "Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
