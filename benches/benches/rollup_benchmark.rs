//! Roll-up and aggregation throughput.
//!
//! Run with: `cargo bench --package aurum-bench`

use aurum_bench::{minute_series, series_start};
use aurum_lib::{Aggregator, DEFAULT_RETENTION, FileStore, MemoryStore, Resolution, roll_up};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tempfile::TempDir;

fn rollup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("roll_up");

    for (name, resolution, size) in [("5min", Resolution::Minute5, 5), ("1h", Resolution::Hour1, 60)] {
        let candles = minute_series(series_start(), size);
        let close_at = candles[size - 1].timestamp;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("window", name), &candles, |b, candles| {
            b.iter(|| roll_up(resolution, close_at, black_box(candles), DEFAULT_RETENTION));
        });
    }

    group.finish();
}

fn aggregator_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let hour = minute_series(series_start(), 60);

    let mut group = c.benchmark_group("on_new_minute");
    group.throughput(Throughput::Elements(hour.len() as u64));

    group.bench_function("memory_store", |b| {
        b.to_async(&runtime).iter(|| async {
            let aggregator = Aggregator::new(MemoryStore::new(), DEFAULT_RETENTION);
            for candle in &hour {
                black_box(aggregator.on_new_minute(candle).await.unwrap());
            }
        });
    });

    group.sample_size(10);
    group.bench_function("file_store", |b| {
        b.to_async(&runtime).iter(|| async {
            let dir = TempDir::new().unwrap();
            let store = FileStore::open(dir.path().to_path_buf()).unwrap();
            let aggregator = Aggregator::new(store, DEFAULT_RETENTION);
            for candle in &hour {
                black_box(aggregator.on_new_minute(candle).await.unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, rollup_benchmark, aggregator_benchmark);
criterion_main!(benches);
