//! Durable series store backed by JSON partition files.

use async_trait::async_trait;
use aurum_types::{Candle, Resolution, TimeKey};
use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;

use crate::{Result, SeriesStore, StoreError};

/// Format of partition file stems.
const PARTITION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Name of the lock file under `series/` guarding partition rewrites.
const LOCK_FILE_NAME: &str = ".lock";

/// Series store persisting candles as JSON files on disk.
///
/// Candles are partitioned by resolution and UTC day of their timestamp:
/// `<base>/series/<resolution>/<YYYY-MM-DD>.json`. Each file holds a JSON
/// array sorted by timestamp. Writes replace a partition through a
/// uniquely named temporary file and a rename, so readers never observe a
/// torn file.
///
/// Every read-modify-write holds an exclusive advisory lock on
/// `<base>/series/.lock`, so any number of handles and processes may share
/// one directory.
#[derive(Debug)]
pub struct FileStore {
    /// Base directory for store data.
    base_path: PathBuf,
    /// Directory holding one sub-directory per resolution.
    series_path: PathBuf,
    /// Serializes writers within this handle before the file lock is taken.
    write_lock: Mutex<()>,
}

/// Exclusive hold on the store's lock file, released on drop.
#[derive(Debug)]
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileStore {
    /// Opens a store at the given base path.
    ///
    /// Creates the partition directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn open(base_path: PathBuf) -> Result<Self> {
        let series_path = base_path.join("series");

        for resolution in Resolution::all() {
            let path = series_path.join(resolution.as_str());
            if !path.exists() {
                std::fs::create_dir_all(&path)
                    .map_err(|e| StoreError::CreateDir { path, source: e })?;
            }
        }

        Ok(Self {
            base_path,
            series_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the default path for aurum data.
    ///
    /// Uses the `directories` crate to find the appropriate location:
    /// - Linux: `~/.local/share/aurum/`
    /// - macOS: `~/Library/Application Support/aurum/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\aurum\`
    ///
    /// Falls back to `~/.aurum/` if the platform-specific location cannot be
    /// determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "aurum").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Opens a store at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::open(Self::default_path())
    }

    /// Returns the base path of the store.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the directory holding partitions of `resolution`.
    #[must_use]
    pub fn resolution_path(&self, resolution: Resolution) -> PathBuf {
        self.series_path.join(resolution.as_str())
    }

    /// Returns the partition file for `resolution` on `date`.
    #[must_use]
    pub fn partition_path(&self, resolution: Resolution, date: NaiveDate) -> PathBuf {
        self.resolution_path(resolution)
            .join(format!("{}.json", date.format(PARTITION_DATE_FORMAT)))
    }

    /// Returns the lock file shared by every handle on this directory.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.series_path.join(LOCK_FILE_NAME)
    }

    /// Blocks until this handle holds the exclusive cross-process lock.
    async fn lock_exclusive(&self) -> Result<LockGuard> {
        let path = self.lock_path();
        tokio::task::spawn_blocking(move || -> Result<LockGuard> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&path)
                .and_then(|file| FileExt::lock_exclusive(&file).map(|()| file))
                .map_err(|e| StoreError::Lock {
                    path: path.clone(),
                    source: e,
                })?;
            Ok(LockGuard { file })
        })
        .await
        .map_err(|e| StoreError::Lock {
            path: self.lock_path(),
            source: std::io::Error::other(e),
        })?
    }

    /// Lists the days that have a partition file for `resolution`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution directory cannot be read.
    pub async fn partition_dates(&self, resolution: Resolution) -> Result<Vec<NaiveDate>> {
        let dir = self.resolution_path(resolution);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::ReadDir { path: dir, source: e }),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::ReadDir {
                path: dir.clone(),
                source: e,
            })?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(date) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| NaiveDate::parse_from_str(stem, PARTITION_DATE_FORMAT).ok())
            {
                dates.push(date);
            }
        }

        dates.sort_unstable();
        Ok(dates)
    }

    /// Loads one partition, keyed by timestamp. A missing file is empty.
    async fn load_partition(&self, path: &Path) -> Result<BTreeMap<TimeKey, Candle>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::ReadFile {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let candles: Vec<Candle> =
            serde_json::from_str(&content).map_err(|e| StoreError::ParseJson {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(candles.into_iter().map(|c| (c.key(), c)).collect())
    }

    /// Writes a partition, deleting the file when it becomes empty.
    async fn save_partition(&self, path: &Path, partition: &BTreeMap<TimeKey, Candle>) -> Result<()> {
        if partition.is_empty() {
            return match fs::remove_file(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::DeleteFile {
                    path: path.to_path_buf(),
                    source: e,
                }),
            };
        }

        let candles: Vec<&Candle> = partition.values().collect();
        let json = serde_json::to_vec(&candles)?;

        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_atomic(&target, &json))
            .await
            .map_err(|e| StoreError::WriteFile {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })?
    }
}

/// Writes `bytes` to a fresh temporary file beside `path` and renames it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| StoreError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[async_trait]
impl SeriesStore for FileStore {
    async fn put(&self, candle: &Candle) -> Result<()> {
        let path = self.partition_path(candle.resolution, candle.timestamp.date_naive());

        let _guard = self.write_lock.lock().await;
        let _lock = self.lock_exclusive().await?;
        let mut partition = self.load_partition(&path).await?;
        partition.insert(candle.key(), candle.clone());
        self.save_partition(&path, &partition).await?;

        tracing::trace!(
            resolution = %candle.resolution,
            timestamp = %candle.key(),
            "stored candle"
        );
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

        let first_day = start.to_datetime().date_naive();
        let last_day = end.to_datetime().date_naive();

        let mut candles = Vec::new();
        for date in self.partition_dates(resolution).await? {
            if date < first_day || date > last_day {
                continue;
            }
            let partition = self
                .load_partition(&self.partition_path(resolution, date))
                .await?;
            candles.extend(
                partition
                    .range(start.clone()..=end.clone())
                    .map(|(_, candle)| candle.clone()),
            );
        }

        Ok(candles)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let _lock = self.lock_exclusive().await?;
        let mut removed = 0;

        for resolution in Resolution::all() {
            for date in self.partition_dates(*resolution).await? {
                let path = self.partition_path(*resolution, date);
                let mut partition = self.load_partition(&path).await?;

                let before = partition.len();
                partition.retain(|_, candle| !candle.is_expired(now));
                if partition.len() != before {
                    removed += before - partition.len();
                    self.save_partition(&path, &partition).await?;
                }
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "purged expired candles");
        }
        Ok(removed)
    }
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".aurum")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_types::{DEFAULT_RETENTION, DEFAULT_SYMBOL};
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn candle_at(resolution: Resolution, day: u32, hour: u32, minute: u32, close: f64) -> Candle {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap();
        Candle::new(
            ts,
            resolution,
            DEFAULT_SYMBOL,
            close,
            close + 0.5,
            close - 0.5,
            close,
            3.0,
            DEFAULT_RETENTION,
        )
    }

    fn key(day: u32, hour: u32, minute: u32) -> TimeKey {
        TimeKey::from_datetime(Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap())
    }

    #[test]
    fn test_store_creation() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        assert!(store.base_path().exists());
        assert!(temp_dir.path().join("series").join("1min").exists());
        assert!(temp_dir.path().join("series").join("5min").exists());
        assert!(temp_dir.path().join("series").join("1h").exists());
    }

    #[test]
    fn test_partition_path() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let path = store.partition_path(Resolution::Hour1, date);
        assert!(path.ends_with("series/1h/2024-01-02.json"));
    }

    #[tokio::test]
    async fn test_put_and_query() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        store.put(&candle_at(Resolution::Minute1, 1, 12, 2, 2.0)).await.unwrap();
        store.put(&candle_at(Resolution::Minute1, 1, 12, 0, 0.0)).await.unwrap();
        store.put(&candle_at(Resolution::Minute1, 1, 12, 1, 1.0)).await.unwrap();

        let result = store
            .query(Resolution::Minute1, &key(1, 12, 0), &key(1, 12, 1))
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].close, 0.0);
        assert_eq!(result[1].close, 1.0);
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        let candle = candle_at(Resolution::Minute5, 1, 12, 5, 7.0);
        store.put(&candle).await.unwrap();
        store.put(&candle).await.unwrap();

        let result = store
            .query(Resolution::Minute5, &key(1, 0, 0), &key(1, 23, 59))
            .await
            .unwrap();
        assert_eq!(result, vec![candle]);
    }

    #[tokio::test]
    async fn test_query_spans_days() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        store.put(&candle_at(Resolution::Hour1, 2, 1, 0, 3.0)).await.unwrap();
        store.put(&candle_at(Resolution::Hour1, 1, 23, 0, 2.0)).await.unwrap();
        store.put(&candle_at(Resolution::Hour1, 1, 22, 0, 1.0)).await.unwrap();
        store.put(&candle_at(Resolution::Hour1, 3, 0, 0, 4.0)).await.unwrap();

        let result = store
            .query(Resolution::Hour1, &key(1, 23, 0), &key(2, 23, 0))
            .await
            .unwrap();
        let closes: Vec<f64> = result.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![2.0, 3.0]);

        let dates = store.partition_dates(Resolution::Hour1).await.unwrap();
        assert_eq!(dates.len(), 3);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let candle = candle_at(Resolution::Minute1, 1, 9, 30, 42.0);
        {
            let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();
            store.put(&candle).await.unwrap();
        }

        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();
        let result = store
            .query(Resolution::Minute1, &key(1, 9, 30), &key(1, 9, 30))
            .await
            .unwrap();
        assert_eq!(result, vec![candle]);
    }

    #[tokio::test]
    async fn test_purge_removes_emptied_partitions() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        let old = candle_at(Resolution::Minute1, 1, 0, 0, 1.0);
        let newer = candle_at(Resolution::Minute1, 5, 0, 0, 2.0);
        store.put(&old).await.unwrap();
        store.put(&newer).await.unwrap();

        let now = old.expires_at + TimeDelta::minutes(1);
        assert_eq!(store.purge_expired(now).await.unwrap(), 1);

        let dates = store.partition_dates(Resolution::Minute1).await.unwrap();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()]);
    }

    #[tokio::test]
    async fn test_corrupt_partition_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        std::fs::write(store.partition_path(Resolution::Minute1, date), "not json").unwrap();

        let result = store
            .query(Resolution::Minute1, &key(1, 0, 0), &key(1, 23, 59))
            .await;
        assert!(matches!(result, Err(StoreError::ParseJson { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_handles_share_directory() {
        let temp_dir = TempDir::new().unwrap();
        let first = Arc::new(FileStore::open(temp_dir.path().to_path_buf()).unwrap());
        let second = Arc::new(FileStore::open(temp_dir.path().to_path_buf()).unwrap());

        let mut tasks = Vec::new();
        for i in 0..120u32 {
            let store = if i % 2 == 0 {
                Arc::clone(&first)
            } else {
                Arc::clone(&second)
            };
            tasks.push(tokio::spawn(async move {
                let candle = candle_at(Resolution::Minute1, 1, 10 + i / 60, i % 60, f64::from(i));
                store.put(&candle).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reader = FileStore::open(temp_dir.path().to_path_buf()).unwrap();
        let stored = reader
            .query(Resolution::Minute1, &key(1, 0, 0), &key(1, 23, 59))
            .await
            .unwrap();
        assert_eq!(stored.len(), 120);
        assert!(stored.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        let leftovers: Vec<_> = std::fs::read_dir(reader.resolution_path(Resolution::Minute1))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("2024-01-01.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_writer_waits_for_lock_holder() {
        let temp_dir = TempDir::new().unwrap();
        let holder = FileStore::open(temp_dir.path().to_path_buf()).unwrap();
        let writer = FileStore::open(temp_dir.path().to_path_buf()).unwrap();

        let guard = holder.lock_exclusive().await.unwrap();
        let candle = candle_at(Resolution::Minute1, 1, 8, 0, 1.0);
        let pending = tokio::spawn(async move { writer.put(&candle).await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!pending.is_finished());
        assert!(
            holder
                .query(Resolution::Minute1, &key(1, 0, 0), &key(1, 23, 59))
                .await
                .unwrap()
                .is_empty()
        );

        drop(guard);
        pending.await.unwrap().unwrap();
        assert_eq!(
            holder
                .query(Resolution::Minute1, &key(1, 0, 0), &key(1, 23, 59))
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
