//! Upstream quote fetching for aurum.
//!
//! This crate provides the ingestion side of the service:
//!
//! - [`QuoteClient`] - HTTP client with connection pooling and retries
//! - [`QuoteSource`] - Seam for anything that yields the latest minute
//! - [`parse_latest`] - `time_series` response parsing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/aurum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod parse;

pub use client::{ClientConfig, DEFAULT_API_URL, FetchError, QuoteClient, QuoteSource};
pub use parse::{PROVIDER_DATETIME_FORMAT, ParseError, Quote, parse_latest, provider_error};
