//! CLI command implementations.

pub(crate) mod ingest;
pub(crate) mod purge;
pub(crate) mod query;
pub(crate) mod run;
pub(crate) mod serve;

use anyhow::{Context, Result};
use aurum_lib::prelude::*;
use std::sync::Arc;

/// Opens the file store at the configured or default data directory.
pub(crate) fn open_store(config: &ServiceConfig) -> Result<Arc<FileStore>> {
    let path = config
        .data_dir
        .clone()
        .unwrap_or_else(FileStore::default_path);
    let store = FileStore::open(path.clone())
        .with_context(|| format!("Failed to open data directory {}", path.display()))?;
    tracing::debug!(path = %path.display(), "opened file store");
    Ok(Arc::new(store))
}

/// Builds the ingestion cycle over a fresh quote client.
pub(crate) fn ingestion_cycle(
    config: &ServiceConfig,
    store: Arc<FileStore>,
) -> Result<IngestionCycle<QuoteClient, Arc<FileStore>>> {
    let client_config = config.client_config()?;
    let client = QuoteClient::new(client_config).context("Failed to create HTTP client")?;
    Ok(IngestionCycle::new(
        client,
        store,
        config.symbol.clone(),
        config.retention,
    ))
}
