//! Read-only range queries over stored candles.

use aurum_store::SeriesStore;
use aurum_types::{AurumError, Candle, Resolution, Result, TimeKey};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::Serialize;

/// Lookback applied when a caller gives none.
pub const DEFAULT_LOOKBACK: TimeDelta = TimeDelta::hours(24);

/// Converts a lookback in whole hours, rejecting zero.
///
/// # Errors
///
/// Returns [`AurumError::InvalidArgument`] if `hours` is zero.
pub fn lookback_from_hours(hours: u32) -> Result<TimeDelta> {
    if hours == 0 {
        return Err(AurumError::InvalidArgument(
            "hours must be a positive integer".to_string(),
        ));
    }
    Ok(TimeDelta::hours(i64::from(hours)))
}

/// One candle as returned to query clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRow {
    /// Closing timestamp key.
    pub timestamp: String,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume.
    pub volume: f64,
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        Self {
            timestamp: candle.key().to_string(),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

/// Result of a range query, oldest candle first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Candles in chronological order.
    pub data: Vec<CandleRow>,
    /// Resolution that was queried.
    pub timeframe: Resolution,
    /// Number of candles in `data`.
    pub count: usize,
}

/// Serves time-range reads for one resolution at a time.
#[derive(Debug, Clone)]
pub struct RangeQueryService<S> {
    store: S,
}

impl<S: SeriesStore> RangeQueryService<S> {
    /// Creates a service reading from `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Queries the last `lookback` of candles for a timeframe given by name.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] for an unknown timeframe or a
    /// non-positive lookback, without touching the store, and
    /// [`AurumError::Store`] if the read fails.
    pub async fn query_range(&self, timeframe: &str, lookback: TimeDelta) -> Result<QueryResult> {
        let resolution: Resolution = timeframe.parse()?;
        self.query_range_at(resolution, lookback, Utc::now()).await
    }

    /// Queries candles of `resolution` in `[now - lookback, now]`.
    ///
    /// `now` is truncated to whole seconds so both bounds compare against
    /// stored keys at the same precision.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] for a non-positive lookback and
    /// [`AurumError::Store`] if the read fails.
    pub async fn query_range_at(
        &self,
        resolution: Resolution,
        lookback: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<QueryResult> {
        if lookback <= TimeDelta::zero() {
            return Err(AurumError::InvalidArgument(
                "lookback must be positive".to_string(),
            ));
        }

        let end = now.trunc_subsecs(0);
        let start = end.checked_sub_signed(lookback).ok_or_else(|| {
            AurumError::InvalidArgument(format!("lookback {lookback} is out of range"))
        })?;

        let mut candles = self
            .store
            .query(
                resolution,
                &TimeKey::from_datetime(start),
                &TimeKey::from_datetime(end),
            )
            .await?;
        candles.sort_by_key(|candle| candle.timestamp);

        tracing::debug!(%resolution, %start, %end, count = candles.len(), "range query");

        let data: Vec<CandleRow> = candles.iter().map(CandleRow::from).collect();
        Ok(QueryResult {
            count: data.len(),
            data,
            timeframe: resolution,
        })
    }
}
