//! Scheduled ingestion loop.
//!
//! Each tick runs one ingestion cycle and then purges expired candles. A
//! failed cycle is logged and the loop carries on; the next tick is the retry.

use anyhow::Result;
use aurum_lib::prelude::*;
use chrono::Utc;
use tokio::time::MissedTickBehavior;

use super::{ingestion_cycle, open_store};

/// Ingest at the configured interval until Ctrl+C.
pub(crate) async fn run(config: &ServiceConfig) -> Result<()> {
    let store = open_store(config)?;
    let cycle = ingestion_cycle(config, store.clone())?;

    let mut interval = tokio::time::interval(config.ingest_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        symbol = %config.symbol,
        interval_secs = config.ingest_interval.as_secs(),
        "ingestion scheduler started"
    );

    let mut cycles: u64 = 0;
    let mut failures: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                }
                break;
            }
        }

        cycles += 1;
        if !cycle.run().await.is_success() {
            failures += 1;
        }

        match store.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "purged expired candles"),
            Err(e) => tracing::warn!(error = %e, "purge failed"),
        }
    }

    tracing::info!(cycles, failures, "ingestion scheduler stopped");
    Ok(())
}
