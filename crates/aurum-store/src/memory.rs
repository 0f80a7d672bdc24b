//! In-process series store.

use async_trait::async_trait;
use aurum_types::{Candle, Resolution, TimeKey};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::{Result, SeriesStore};

type Partition = BTreeMap<TimeKey, Candle>;

/// Series store held entirely in memory.
///
/// Each resolution is a `BTreeMap` ordered by [`TimeKey`], so range reads
/// come back sorted without further work. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<Resolution, Partition>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of candles stored for `resolution`.
    pub async fn len(&self, resolution: Resolution) -> usize {
        self.partitions
            .read()
            .await
            .get(&resolution)
            .map_or(0, BTreeMap::len)
    }

    /// Returns true if no candle of any resolution is stored.
    pub async fn is_empty(&self) -> bool {
        self.partitions.read().await.values().all(BTreeMap::is_empty)
    }
}

#[async_trait]
impl SeriesStore for MemoryStore {
    async fn put(&self, candle: &Candle) -> Result<()> {
        self.partitions
            .write()
            .await
            .entry(candle.resolution)
            .or_default()
            .insert(candle.key(), candle.clone());
        Ok(())
    }

    async fn query(
        &self,
        resolution: Resolution,
        start: &TimeKey,
        end: &TimeKey,
    ) -> Result<Vec<Candle>> {
        if start > end {
            return Ok(Vec::new());
        }

        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(&resolution)
            .map(|partition| {
                partition
                    .range(start.clone()..=end.clone())
                    .map(|(_, candle)| candle.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut partitions = self.partitions.write().await;
        let mut removed = 0;

        for partition in partitions.values_mut() {
            let before = partition.len();
            partition.retain(|_, candle| !candle.is_expired(now));
            removed += before - partition.len();
        }

        Ok(removed)
    }
}
