//! Ingestion cycle, range queries and HTTP endpoint for aurum.
//!
//! This crate wires the lower crates into the two entry points of the service:
//!
//! - [`IngestionCycle`] - Scheduled fetch of the latest minute plus roll-up
//! - [`RangeQueryService`] - Read-only queries over a lookback window
//! - [`router`] / [`serve`] - `GET /candles` and `GET /health` over axum
//! - [`ServiceConfig`] - Environment-driven configuration

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod http;
mod ingest;
mod query;

pub use config::{DEFAULT_BIND, DEFAULT_INGEST_INTERVAL, DEFAULT_PORT, ServiceConfig};
pub use http::{ApiError, CandleParams, get_candles, health, router, serve};
pub use ingest::{CycleStatus, IngestionCycle};
pub use query::{CandleRow, DEFAULT_LOOKBACK, QueryResult, RangeQueryService, lookback_from_hours};
