//! Serve command implementation.

use anyhow::{Context, Result};
use aurum_lib::prelude::*;
use aurum_lib::serve as serve_http;
use std::sync::Arc;

use super::open_store;

/// Serve `GET /candles` and `GET /health` until Ctrl+C.
pub(crate) async fn serve(config: &ServiceConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let store = open_store(config)?;
    let service = Arc::new(RangeQueryService::new(store));

    serve_http(service, addr, shutdown_signal())
        .await
        .with_context(|| format!("Query endpoint on {addr} failed"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("shutdown signal received");
}
