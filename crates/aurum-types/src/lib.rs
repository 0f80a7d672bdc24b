//! Core types for the aurum candle service.
//!
//! This crate provides the fundamental data structures shared by every
//! other aurum crate:
//!
//! - [`Candle`] - One OHLCV record of a given resolution
//! - [`Resolution`] - Candle granularity and its windowing rules
//! - [`TimeKey`] - Fixed-width, byte-sortable timestamp encoding
//! - [`AurumError`] - Error taxonomy of ingestion and queries

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod error;
mod resolution;
mod time_key;

pub use candle::{Candle, DEFAULT_RETENTION, DEFAULT_SYMBOL};
pub use error::{AurumError, ErrorKind, Result};
pub use resolution::{Resolution, ResolutionParseError};
pub use time_key::{TIME_KEY_FORMAT, TIME_KEY_LEN, TimeKey, TimeKeyError, serde_time_key};
