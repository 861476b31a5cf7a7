use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seriesmon_core::{DatasetRegistry, SeriesDataset, SeriesKey};

/// Benchmark observe() on an existing dataset
fn bench_observe_existing_dataset(c: &mut Criterion) {
    let dataset = SeriesDataset::new(SeriesKey::new("server", "HeapUsage"), 30, 0, 0);
    let mut t = 0i64;

    c.bench_function("observe_existing_dataset", |b| {
        b.iter(|| {
            t += 1;
            dataset.observe(black_box(t), black_box(t % 7));
        });
    });
}

/// Benchmark observe() with varying ring capacities
fn bench_observe_varying_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe_capacity");

    for capacity in [1, 30, 300, 3000].iter() {
        let dataset = SeriesDataset::new(SeriesKey::new("server", "HeapUsage"), *capacity, 0, 0);
        let mut t = 0i64;

        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, _| {
            b.iter(|| {
                t += 1;
                dataset.observe(black_box(t), black_box(t));
            });
        });
    }
    group.finish();
}

/// Benchmark routing through the registry (fast path, key already present)
fn bench_registry_observe_existing_key(c: &mut Criterion) {
    let registry = DatasetRegistry::default();
    let key = SeriesKey::new("server", "ThreadCount");
    registry.observe(&key, 0, 0);
    let mut t = 0i64;

    c.bench_function("registry_observe_existing_key", |b| {
        b.iter(|| {
            t += 1;
            registry.observe(black_box(&key), black_box(t), black_box(12));
        });
    });
}

/// Benchmark routing through the registry when every key is new (slow path)
fn bench_registry_observe_new_keys(c: &mut Criterion) {
    c.bench_function("registry_observe_new_keys", |b| {
        b.iter_with_setup(
            || {
                let keys: Vec<SeriesKey> = (0..100)
                    .map(|i| SeriesKey::new(format!("node-{}", i), "CpuUsage"))
                    .collect();
                (DatasetRegistry::default(), keys)
            },
            |(registry, keys)| {
                for key in &keys {
                    black_box(registry.observe(key, 0, 1));
                }
            },
        );
    });
}

/// Benchmark values near the limits of i64 (exercises the unbounded sum)
fn bench_observe_extreme_values(c: &mut Criterion) {
    let dataset = SeriesDataset::new(SeriesKey::new("server", "Counter"), 30, 0, i64::MAX);
    let mut t = 0i64;

    c.bench_function("observe_extreme_values", |b| {
        b.iter(|| {
            t += 1;
            dataset.observe(black_box(t), black_box(i64::MAX));
        });
    });
}

criterion_group!(
    benches,
    bench_observe_existing_dataset,
    bench_observe_varying_capacity,
    bench_registry_observe_existing_key,
    bench_registry_observe_new_keys,
    bench_observe_extreme_values,
);
criterion_main!(benches);
