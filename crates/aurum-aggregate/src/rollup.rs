//! OHLCV roll-up of fine-grained candles into one coarse candle.

use aurum_types::{Candle, Resolution};
use chrono::{DateTime, TimeDelta, Utc};

/// Builder folding chronologically ordered candles into one.
#[derive(Debug, Clone)]
pub struct Rollup {
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    count: u32,
}

impl Rollup {
    /// Creates a builder from the earliest constituent.
    #[must_use]
    pub const fn new(first: &Candle) -> Self {
        Self {
            first: first.timestamp,
            last: first.timestamp,
            open: first.open,
            high: first.high,
            low: first.low,
            close: first.close,
            volume: first.volume,
            count: 1,
        }
    }

    /// Folds in the next constituent, which must not precede the previous one.
    pub fn update(&mut self, candle: &Candle) {
        debug_assert!(candle.timestamp >= self.last, "constituents out of order");
        self.last = candle.timestamp;
        self.high = self.high.max(candle.high);
        self.low = self.low.min(candle.low);
        self.close = candle.close;
        self.volume += candle.volume;
        self.count += 1;
    }

    /// Returns the number of constituents folded in so far.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns the timestamps of the first and last constituents.
    #[must_use]
    pub const fn span(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.first, self.last)
    }

    /// Finishes building, stamping the candle at the window's closing edge.
    #[must_use]
    pub fn finish(
        self,
        resolution: Resolution,
        close_at: DateTime<Utc>,
        symbol: impl Into<String>,
        retention: TimeDelta,
    ) -> Candle {
        Candle::new(
            close_at,
            resolution,
            symbol,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            retention,
        )
    }
}

/// Rolls `constituents` up into a single `resolution` candle closing at `close_at`.
///
/// Constituents are ordered by timestamp first, so `open` comes from the
/// earliest and `close` from the latest regardless of the input order.
/// Returns `None` when there is nothing to roll up.
#[must_use]
pub fn roll_up(
    resolution: Resolution,
    close_at: DateTime<Utc>,
    constituents: &[Candle],
    retention: TimeDelta,
) -> Option<Candle> {
    let mut ordered: Vec<&Candle> = constituents.iter().collect();
    ordered.sort_by_key(|candle| candle.timestamp);

    let (first, rest) = ordered.split_first()?;
    let mut rollup = Rollup::new(first);
    for candle in rest {
        rollup.update(candle);
    }

    Some(rollup.finish(resolution, close_at, first.symbol.clone(), retention))
}
