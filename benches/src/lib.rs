//! Benchmark utilities for aurum.

use aurum_lib::{Candle, DEFAULT_RETENTION, DEFAULT_SYMBOL, Resolution};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Start of every synthetic series: 2024-01-01T00:01:00Z.
#[must_use]
pub fn series_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0)
        .single()
        .unwrap_or_default()
}

/// Builds `count` consecutive 1-minute candles starting at `start`.
///
/// Prices follow a deterministic zig-zag walk around 2000.0 so runs are
/// comparable across machines.
#[must_use]
pub fn minute_series(start: DateTime<Utc>, count: usize) -> Vec<Candle> {
    let mut price = 2000.0_f64;
    (0..count)
        .map(|i| {
            let step = ((i * 7919) % 13) as f64 / 10.0 - 0.6;
            let open = price;
            let close = open + step;
            price = close;
            Candle::new(
                start + TimeDelta::minutes(i as i64),
                Resolution::Minute1,
                DEFAULT_SYMBOL,
                open,
                open.max(close) + 0.25,
                open.min(close) - 0.25,
                close,
                10.0 + (i % 5) as f64,
                DEFAULT_RETENTION,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_series_is_consecutive() {
        let series = minute_series(series_start(), 120);
        assert_eq!(series.len(), 120);
        assert!(series.windows(2).all(|w| w[1].timestamp - w[0].timestamp == TimeDelta::minutes(1)));
        assert!(series.iter().all(|c| c.low <= c.open && c.high >= c.close));
    }
}
