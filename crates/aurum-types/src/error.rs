//! Error types for aurum.

use thiserror::Error;

use crate::{ResolutionParseError, TimeKeyError};

/// Result type alias for aurum operations.
pub type Result<T> = std::result::Result<T, AurumError>;

/// Errors surfaced by ingestion and query operations.
///
/// A window with no constituent candles is not an error; the aggregator
/// reports it as a skipped outcome instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AurumError {
    /// The quote provider could not be reached.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The quote provider answered with an error or an unusable payload.
    #[error("Upstream data error: {0}")]
    UpstreamData(String),

    /// A caller-supplied parameter was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The series store failed to read or write.
    #[error("Store error: {0}")]
    Store(String),
}

/// Coarse classification of an [`AurumError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AurumError::UpstreamUnavailable`].
    UpstreamUnavailable,
    /// See [`AurumError::UpstreamData`].
    UpstreamDataError,
    /// See [`AurumError::InvalidArgument`].
    InvalidArgument,
    /// See [`AurumError::Store`].
    StoreError,
}

impl ErrorKind {
    /// Returns the kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UpstreamDataError => "upstream_data_error",
            Self::InvalidArgument => "invalid_argument",
            Self::StoreError => "store_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AurumError {
    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::UpstreamData(_) => ErrorKind::UpstreamDataError,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Store(_) => ErrorKind::StoreError,
        }
    }

    /// Returns true if the caller, not the system, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true if the next scheduled cycle may succeed without intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !self.is_client_error()
    }
}

impl From<ResolutionParseError> for AurumError {
    fn from(e: ResolutionParseError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<TimeKeyError> for AurumError {
    fn from(e: TimeKeyError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Resolution;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AurumError::Store("disk full".into()).kind(),
            ErrorKind::StoreError
        );
        assert!(AurumError::InvalidArgument("x".into()).is_client_error());
        assert!(AurumError::UpstreamUnavailable("x".into()).is_retryable());
    }

    #[test]
    fn test_resolution_error_is_invalid_argument() {
        let err: AurumError = "2min".parse::<Resolution>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("2min"));
    }
}
