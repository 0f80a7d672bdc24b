//! The scheduled ingestion cycle.

use aurum_aggregate::{AggregationReport, Aggregator};
use aurum_fetch::QuoteSource;
use aurum_store::SeriesStore;
use aurum_types::{ErrorKind, Result};
use chrono::{DateTime, TimeDelta, Utc};

/// Outcome of one ingestion cycle, as reported to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleStatus {
    /// The minute was stored and its windows were processed.
    Succeeded {
        /// Timestamp of the ingested minute.
        timestamp: DateTime<Utc>,
        /// Per-window aggregation outcomes.
        report: AggregationReport,
    },
    /// Nothing was stored this cycle.
    Failed {
        /// Error category.
        kind: ErrorKind,
        /// Error description.
        message: String,
    },
}

impl CycleStatus {
    /// Returns true if the cycle succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Fetches the latest minute and hands it to the aggregator.
#[derive(Debug)]
pub struct IngestionCycle<Q, S> {
    source: Q,
    aggregator: Aggregator<S>,
    symbol: String,
}

impl<Q: QuoteSource, S: SeriesStore> IngestionCycle<Q, S> {
    /// Creates a cycle stamping candles with `symbol` and `retention`.
    pub fn new(source: Q, store: S, symbol: impl Into<String>, retention: TimeDelta) -> Self {
        Self {
            source,
            aggregator: Aggregator::new(store, retention),
            symbol: symbol.into(),
        }
    }

    /// Returns the aggregator driven by this cycle.
    #[must_use]
    pub const fn aggregator(&self) -> &Aggregator<S> {
        &self.aggregator
    }

    /// Runs one cycle, propagating the first fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote cannot be fetched or the 1-minute
    /// candle cannot be stored. Window failures are reported, not raised.
    pub async fn try_run(&self) -> Result<AggregationReport> {
        let quote = self.source.latest_minute().await?;
        let candle = quote.into_candle(&self.symbol, self.aggregator.retention());
        tracing::debug!(timestamp = %candle.key(), close = candle.close, "fetched minute");
        self.aggregator.on_new_minute(&candle).await
    }

    /// Runs one cycle and reports its status. Never panics on upstream or store errors.
    pub async fn run(&self) -> CycleStatus {
        match self.try_run().await {
            Ok(report) => {
                if report.failures() > 0 {
                    tracing::warn!(
                        minute = %report.minute,
                        failures = report.failures(),
                        "ingestion cycle completed with window failures"
                    );
                } else {
                    tracing::info!(
                        minute = %report.minute,
                        derived = report.written().count(),
                        "ingestion cycle completed"
                    );
                }
                CycleStatus::Succeeded {
                    timestamp: report.minute,
                    report,
                }
            }
            Err(e) => {
                tracing::error!(kind = %e.kind(), error = %e, "ingestion cycle failed");
                CycleStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aurum_fetch::{FetchError, ParseError, Quote};
    use aurum_store::MemoryStore;
    use aurum_types::{DEFAULT_RETENTION, Resolution, TimeKey};
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays minutes 12:00, 12:01, ... one per call.
    struct ReplaySource {
        next: AtomicU32,
    }

    #[async_trait]
    impl QuoteSource for ReplaySource {
        async fn latest_minute(&self) -> std::result::Result<Quote, FetchError> {
            let m = self.next.fetch_add(1, Ordering::SeqCst);
            let price = 2000.0 + f64::from(m);
            Ok(Quote {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, m, 0).unwrap(),
                open: price,
                high: price + 0.5,
                low: price - 0.5,
                close: price + 0.25,
                volume: 10.0,
            })
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl QuoteSource for BrokenSource {
        async fn latest_minute(&self) -> std::result::Result<Quote, FetchError> {
            Err(FetchError::Parse(ParseError::Provider {
                code: 401,
                message: "Invalid API key".to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn test_cycles_build_five_minute_candle() {
        let store = Arc::new(MemoryStore::new());
        let cycle = IngestionCycle::new(
            ReplaySource {
                next: AtomicU32::new(1),
            },
            Arc::clone(&store),
            "XAU/USD",
            DEFAULT_RETENTION,
        );

        let mut statuses = Vec::new();
        for _ in 0..5 {
            statuses.push(cycle.run().await);
        }
        assert!(statuses.iter().all(CycleStatus::is_success));
        assert_eq!(store.len(Resolution::Minute1).await, 5);

        let CycleStatus::Succeeded { timestamp, report } = &statuses[4] else {
            panic!("expected success");
        };
        assert_eq!(*timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 12, 5, 0).unwrap());
        let bar = report.written().next().unwrap();
        assert_eq!(bar.resolution, Resolution::Minute5);
        assert_eq!(bar.open, 2001.0);
        assert_eq!(bar.close, 2005.25);
        assert_eq!(bar.volume, 50.0);
        assert_eq!(bar.symbol, "XAU/USD");

        let start = TimeKey::parse("2024-01-01T12:00:00Z").unwrap();
        let end = TimeKey::parse("2024-01-01T13:00:00Z").unwrap();
        assert_eq!(
            store.query(Resolution::Minute5, &start, &end).await.unwrap(),
            vec![bar.clone()]
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_reports_status() {
        let store = Arc::new(MemoryStore::new());
        let cycle = IngestionCycle::new(BrokenSource, Arc::clone(&store), "XAU/USD", DEFAULT_RETENTION);

        match cycle.run().await {
            CycleStatus::Failed { kind, message } => {
                assert_eq!(kind, ErrorKind::UpstreamDataError);
                assert!(message.contains("401"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_try_run_propagates_error() {
        let cycle = IngestionCycle::new(BrokenSource, MemoryStore::new(), "XAU/USD", DEFAULT_RETENTION);
        assert!(cycle.try_run().await.is_err());
    }
}
