//! Window roll-up of 1-minute candles for aurum.
//!
//! This crate derives coarse candles from stored 1-minute candles:
//!
//! - [`roll_up`] / [`Rollup`] - OHLCV roll-up of a window's constituents
//! - [`Aggregator`] - Stores arriving minutes and writes completed windows
//! - [`AggregationReport`] - Per-window outcome of one arriving minute

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod rollup;

pub use aggregator::{AggregationReport, Aggregator, WindowOutcome};
pub use rollup::{Rollup, roll_up};
