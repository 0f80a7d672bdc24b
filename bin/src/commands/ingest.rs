//! Ingest command implementation.

use anyhow::{Result, bail};
use aurum_lib::prelude::*;

use super::{ingestion_cycle, open_store};
use crate::display::print_cycle_status;

/// Run a single ingestion cycle, failing the process if nothing was stored.
pub(crate) async fn ingest(config: &ServiceConfig) -> Result<()> {
    let store = open_store(config)?;
    let cycle = ingestion_cycle(config, store)?;

    let status = cycle.run().await;
    print_cycle_status(&status);

    if let CycleStatus::Failed { kind, .. } = status {
        bail!("Ingestion cycle failed: {kind}");
    }
    Ok(())
}
