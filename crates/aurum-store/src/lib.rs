//! Time-partitioned candle series storage for aurum.
//!
//! This crate provides the only persistence boundary of the service:
//!
//! - [`SeriesStore`] - Upsert, inclusive range query and expiry purge
//! - [`MemoryStore`] - In-process store for tests and one-shot runs
//! - [`FileStore`] - Durable store of per-day JSON partitions
//! - [`StoreError`] - Errors raised by store implementations

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::SeriesStore;
