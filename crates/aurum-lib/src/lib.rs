//! Ingest, roll up and query single-instrument OHLCV candles.
//!
//! This is a facade crate that re-exports functionality from the aurum
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use aurum_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::with_default_path()?);
//!     let client = QuoteClient::new(ClientConfig::new("api-key"))?;
//!
//!     let cycle = IngestionCycle::new(client, Arc::clone(&store), DEFAULT_SYMBOL, DEFAULT_RETENTION);
//!     println!("{:?}", cycle.run().await);
//!
//!     let service = RangeQueryService::new(store);
//!     let result = service.query_range("5min", DEFAULT_LOOKBACK).await?;
//!     println!("{} candles", result.count);
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use aurum_types::*;

// Re-export storage
pub use aurum_store::{FileStore, MemoryStore, SeriesStore, StoreError};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use aurum_fetch::{
    ClientConfig, FetchError, ParseError, Quote, QuoteClient, QuoteSource, parse_latest,
};

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use aurum_aggregate::{AggregationReport, Aggregator, Rollup, WindowOutcome, roll_up};

// Re-export the service layer
#[cfg(feature = "service")]
pub use aurum_service::{
    ApiError, CandleRow, CycleStatus, DEFAULT_LOOKBACK, IngestionCycle, QueryResult,
    RangeQueryService, ServiceConfig, lookback_from_hours, router, serve,
};

/// Prelude module for convenient imports.
///
/// ```
/// use aurum_lib::prelude::*;
/// ```
pub mod prelude {
    pub use aurum_types::{
        AurumError, Candle, DEFAULT_RETENTION, DEFAULT_SYMBOL, ErrorKind, Resolution, Result,
        TimeKey,
    };

    pub use aurum_store::{FileStore, MemoryStore, SeriesStore};

    #[cfg(feature = "fetch")]
    pub use aurum_fetch::{ClientConfig, QuoteClient, QuoteSource};

    #[cfg(feature = "aggregate")]
    pub use aurum_aggregate::{Aggregator, WindowOutcome};

    #[cfg(feature = "service")]
    pub use aurum_service::{
        CycleStatus, DEFAULT_LOOKBACK, IngestionCycle, RangeQueryService, ServiceConfig,
    };
}
