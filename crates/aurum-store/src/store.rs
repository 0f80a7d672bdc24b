//! The series store contract.

use async_trait::async_trait;
use aurum_types::{Candle, Resolution, TimeKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::Result;

/// Persistence of candles partitioned by resolution and sorted by time.
///
/// Stores are built once per process and shared by every ingestion cycle
/// and query through an `Arc`.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Upserts a candle keyed by `(resolution, timestamp)`.
    ///
    /// An existing candle under the same key is overwritten. Field values
    /// are not validated.
    async fn put(&self, candle: &Candle) -> Result<()>;

    /// Returns every candle of `resolution` with `start <= key <= end`,
    /// oldest first.
    async fn query(
        &self,
        resolution: Resolution,
        start: &TimeKey,
        end: &TimeKey,
    ) -> Result<Vec<Candle>>;

    /// Removes every candle whose expiry is at or before `now`.
    ///
    /// Returns the number of candles removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

#[async_trait]
impl<S: SeriesStore + ?Sized> SeriesStore for Arc<S> {
    async fn put(&self, candle: &Candle) -> Result<()> {
        (**self).put(candle).await
    }

    async fn query(
        &self,
        resolution: Resolution,
        start: &TimeKey,
        end: &TimeKey,
    ) -> Result<Vec<Candle>> {
        (**self).query(resolution, start, end).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        (**self).purge_expired(now).await
    }
}
