//! Candle (OHLCV record) representation.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Resolution, TimeKey, serde_time_key};

/// Default instrument symbol of a deployment.
pub const DEFAULT_SYMBOL: &str = "XAU/USD";

/// Default retention horizon, measured from a candle's closing timestamp.
pub const DEFAULT_RETENTION: TimeDelta = TimeDelta::days(7);

/// One OHLCV record of a single resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Closing edge of the candle's window (UTC).
    #[serde(with = "serde_time_key")]
    pub timestamp: DateTime<Utc>,
    /// Partition the candle belongs to.
    #[serde(rename = "timeframe")]
    pub resolution: Resolution,
    /// Instrument symbol.
    pub symbol: String,
    /// Opening price.
    pub open: f64,
    /// Highest price during the window.
    pub high: f64,
    /// Lowest price during the window.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume, zero when upstream reports none.
    #[serde(default)]
    pub volume: f64,
    /// Instant after which the store may purge the record.
    #[serde(rename = "ttl", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Candle {
    /// Creates a candle whose expiry is `retention` after its timestamp.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        resolution: Resolution,
        symbol: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        retention: TimeDelta,
    ) -> Self {
        Self {
            timestamp,
            resolution,
            symbol: symbol.into(),
            open,
            high,
            low,
            close,
            volume,
            expires_at: timestamp + retention,
        }
    }

    /// Returns the sort key of this candle within its partition.
    #[must_use]
    pub fn key(&self) -> TimeKey {
        TimeKey::from_datetime(self.timestamp)
    }

    /// Returns true once `now` has passed the candle's expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
