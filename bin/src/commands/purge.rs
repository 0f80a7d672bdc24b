//! Purge command implementation.

use anyhow::{Context, Result};
use aurum_lib::prelude::*;
use chrono::Utc;

use super::open_store;

/// Delete every candle whose expiry has passed.
pub(crate) async fn purge(config: &ServiceConfig) -> Result<()> {
    let store = open_store(config)?;
    let purged = store
        .purge_expired(Utc::now())
        .await
        .context("Failed to purge expired candles")?;
    println!("Purged {purged} expired candle(s)");
    Ok(())
}
