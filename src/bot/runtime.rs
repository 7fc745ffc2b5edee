//! Bridge server runtime.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::bridge;
use super::dispatcher::AppState;

/// Serve the bridge until Ctrl+C.
pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind bridge on {addr}"))?;
    info!("Bridge listening on {}", addr);

    axum::serve(listener, bridge::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Bridge server error")?;

    info!("Bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
