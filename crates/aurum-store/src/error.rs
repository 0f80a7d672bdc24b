//! Store error types.

use aurum_types::AurumError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the series store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a partition file.
    #[error("Failed to read partition '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a partition file.
    #[error("Failed to write partition '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to delete a partition file.
    #[error("Failed to delete partition '{path}': {source}")]
    DeleteFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to list a partition directory.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The path that could not be listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to take the store's write lock.
    #[error("Failed to lock '{path}': {source}")]
    Lock {
        /// The lock file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A partition file holds invalid JSON.
    #[error("Failed to parse partition '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize candles.
    #[error("Failed to serialize candles: {0}")]
    SerializeJson(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for AurumError {
    fn from(e: StoreError) -> Self {
        Self::Store(e.to_string())
    }
}
