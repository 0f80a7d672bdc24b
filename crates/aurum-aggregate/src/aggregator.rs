//! Window-closing aggregation of arriving 1-minute candles.

use aurum_store::SeriesStore;
use aurum_types::{AurumError, Candle, Resolution, Result, TimeKey};
use chrono::{DateTime, TimeDelta, Utc};

use crate::roll_up;

/// What happened to one coarse window during [`Aggregator::on_new_minute`].
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// The window closed and its candle was written.
    Written(Candle),
    /// The window closed but no 1-minute candles were found; nothing written.
    NoData {
        /// Resolution of the skipped window.
        resolution: Resolution,
        /// Closing edge of the skipped window.
        close: DateTime<Utc>,
    },
    /// Reading or writing the window failed.
    Failed {
        /// Resolution of the failed window.
        resolution: Resolution,
        /// Closing edge of the failed window.
        close: DateTime<Utc>,
        /// The underlying error.
        error: AurumError,
    },
}

impl WindowOutcome {
    /// Returns the resolution of the window.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        match self {
            Self::Written(candle) => candle.resolution,
            Self::NoData { resolution, .. } | Self::Failed { resolution, .. } => *resolution,
        }
    }

    /// Returns true if the window's candle was written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }

    /// Returns true if the window failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of feeding one 1-minute candle through the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationReport {
    /// Timestamp of the 1-minute candle that was stored.
    pub minute: DateTime<Utc>,
    /// One entry per coarse window closed by this minute.
    pub windows: Vec<WindowOutcome>,
}

impl AggregationReport {
    /// Returns the coarse candles that were written.
    pub fn written(&self) -> impl Iterator<Item = &Candle> {
        self.windows.iter().filter_map(|outcome| match outcome {
            WindowOutcome::Written(candle) => Some(candle),
            _ => None,
        })
    }

    /// Returns the number of windows that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.windows.iter().filter(|o| o.is_failed()).count()
    }
}

/// Derives 5-minute and 1-hour candles as 1-minute candles arrive.
///
/// The aggregator holds no state of its own. Each call stores the minute,
/// then, for every coarse window the minute closes, reads the window's
/// 1-minute candles back from the store and writes their roll-up.
///
/// The steps are not transactional: if the process dies after the minute
/// is stored but before a roll-up is written, that coarse candle is never
/// produced.
#[derive(Debug, Clone)]
pub struct Aggregator<S> {
    store: S,
    retention: TimeDelta,
}

impl<S: SeriesStore> Aggregator<S> {
    /// Creates an aggregator writing candles that expire `retention` after
    /// their closing timestamp.
    #[must_use]
    pub const fn new(store: S, retention: TimeDelta) -> Self {
        Self { store, retention }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the retention applied to derived candles.
    #[must_use]
    pub const fn retention(&self) -> TimeDelta {
        self.retention
    }

    /// Stores a 1-minute candle and writes every coarse candle it completes.
    ///
    /// Window failures are reported in the returned [`AggregationReport`]
    /// and never stop the other window from being attempted.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] if `candle` is not a 1-minute
    /// candle, and [`AurumError::Store`] if the 1-minute candle itself
    /// cannot be written. No roll-up is attempted in either case.
    pub async fn on_new_minute(&self, candle: &Candle) -> Result<AggregationReport> {
        if candle.resolution != Resolution::Minute1 {
            return Err(AurumError::InvalidArgument(format!(
                "expected a {} candle, got {}",
                Resolution::Minute1,
                candle.resolution
            )));
        }

        self.store.put(candle).await?;
        tracing::info!(timestamp = %candle.key(), "stored 1min candle");

        let mut windows = Vec::new();
        for resolution in Resolution::derived() {
            if !resolution.closes_at(candle.timestamp) {
                continue;
            }

            let outcome = match self.aggregate_window(*resolution, candle.timestamp).await {
                Ok(Some(rolled)) => {
                    tracing::info!(
                        resolution = %resolution,
                        timestamp = %rolled.key(),
                        "aggregated candle"
                    );
                    WindowOutcome::Written(rolled)
                }
                Ok(None) => {
                    tracing::warn!(
                        resolution = %resolution,
                        timestamp = %candle.key(),
                        "no 1min data found to aggregate"
                    );
                    WindowOutcome::NoData {
                        resolution: *resolution,
                        close: candle.timestamp,
                    }
                }
                Err(error) => {
                    tracing::error!(resolution = %resolution, %error, "aggregation failed");
                    WindowOutcome::Failed {
                        resolution: *resolution,
                        close: candle.timestamp,
                        error,
                    }
                }
            };
            windows.push(outcome);
        }

        Ok(AggregationReport {
            minute: candle.timestamp,
            windows,
        })
    }

    /// Rolls up and stores the `resolution` window closing at `close`.
    ///
    /// Returns `Ok(None)` without writing when the window holds no 1-minute
    /// candles.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] for the 1-minute resolution,
    /// which has no window to roll up, and [`AurumError::Store`] if the
    /// store fails.
    pub async fn aggregate_window(
        &self,
        resolution: Resolution,
        close: DateTime<Utc>,
    ) -> Result<Option<Candle>> {
        if !resolution.is_derived() {
            return Err(AurumError::InvalidArgument(format!(
                "{resolution} candles are not derived by aggregation"
            )));
        }

        let (start, end) = resolution.window_for(close);
        let constituents = self
            .store
            .query(
                Resolution::Minute1,
                &TimeKey::from_datetime(start),
                &TimeKey::from_datetime(end),
            )
            .await?;

        let Some(rolled) = roll_up(resolution, close, &constituents, self.retention) else {
            return Ok(None);
        };

        self.store.put(&rolled).await?;
        Ok(Some(rolled))
    }
}
