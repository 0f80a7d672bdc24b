//! Candle resolution definitions.

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle resolution, also the partition key of the series store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Resolution {
    /// 1-minute candles, written straight from upstream.
    #[default]
    #[serde(rename = "1min")]
    Minute1,
    /// 5-minute candles, rolled up from 1-minute candles.
    #[serde(rename = "5min")]
    Minute5,
    /// 1-hour candles, rolled up from 1-minute candles.
    #[serde(rename = "1h")]
    Hour1,
}

impl Resolution {
    /// Returns the resolution as its wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1min",
            Self::Minute5 => "5min",
            Self::Hour1 => "1h",
        }
    }

    /// Returns the length of one candle.
    #[must_use]
    pub const fn duration(&self) -> TimeDelta {
        match self {
            Self::Minute1 => TimeDelta::minutes(1),
            Self::Minute5 => TimeDelta::minutes(5),
            Self::Hour1 => TimeDelta::hours(1),
        }
    }

    /// Distance from the first to the last 1-minute constituent of a window.
    ///
    /// A 5-minute window closing at `T` spans `[T - 4min, T]`, an hourly one
    /// `[T - 59min, T]`.
    #[must_use]
    pub const fn window_span(&self) -> TimeDelta {
        match self {
            Self::Minute1 => TimeDelta::zero(),
            Self::Minute5 => TimeDelta::minutes(4),
            Self::Hour1 => TimeDelta::minutes(59),
        }
    }

    /// Returns true if a 1-minute candle stamped `timestamp` closes a window
    /// of this resolution.
    #[must_use]
    pub fn closes_at(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            Self::Minute1 => true,
            Self::Minute5 => timestamp.minute() % 5 == 0,
            Self::Hour1 => timestamp.minute() == 0,
        }
    }

    /// Returns the inclusive `(start, end)` window that closes at `close`.
    #[must_use]
    pub fn window_for(&self, close: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (close - self.window_span(), close)
    }

    /// Returns true for resolutions derived by roll-up.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        !matches!(self, Self::Minute1)
    }

    /// Resolutions the aggregator derives from 1-minute candles.
    #[must_use]
    pub const fn derived() -> &'static [Self] {
        &[Self::Minute5, Self::Hour1]
    }

    /// Returns all available resolutions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Minute1, Self::Minute5, Self::Hour1]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl Resolution {
    /// Parses a timeframe typed by a person, accepting common aliases in any case.
    ///
    /// [`FromStr`] accepts only the exact wire names.
    ///
    /// # Errors
    ///
    /// Returns an error if the input names none of the resolutions.
    pub fn parse_lenient(s: &str) -> Result<Self, ResolutionParseError> {
        match s.trim().to_lowercase().as_str() {
            "1min" | "1m" | "m1" => Ok(Self::Minute1),
            "5min" | "5m" | "m5" => Ok(Self::Minute5),
            "1h" | "h1" | "60min" => Ok(Self::Hour1),
            _ => Err(ResolutionParseError(s.to_string())),
        }
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resolution| resolution.as_str() == s)
            .ok_or_else(|| ResolutionParseError(s.to_string()))
    }
}

/// Error returned when parsing an invalid resolution string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionParseError(String);

impl std::fmt::Display for ResolutionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', must be one of: 1min, 5min, 1h",
            self.0
        )
    }
}

impl std::error::Error for ResolutionParseError {}
