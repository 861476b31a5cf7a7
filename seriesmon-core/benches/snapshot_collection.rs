use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seriesmon_core::{DatasetRegistry, SeriesKey, SeriesQuery};

fn populated_registry(instances: usize, series: usize) -> DatasetRegistry {
    let registry = DatasetRegistry::default();
    for i in 0..instances {
        for s in 0..series {
            let key = SeriesKey::new(format!("node-{}", i), format!("ns:jvm Series{}", s));
            for t in 0..30 {
                registry.observe(&key, t, (i * 100 + s + t as usize) as i64);
            }
        }
    }
    registry
}

/// Benchmark snapshot() of a single full dataset
fn bench_snapshot_single_dataset(c: &mut Criterion) {
    let registry = populated_registry(1, 1);
    let dataset = registry
        .get(&SeriesKey::new("node-0", "ns:jvm Series0"))
        .expect("dataset exists");

    c.bench_function("snapshot_single_dataset", |b| {
        b.iter(|| {
            black_box(dataset.snapshot());
        });
    });
}

/// Benchmark snapshot_all() with varying dataset counts
fn bench_snapshot_all_varying_datasets(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_all");

    for instances in [1, 10, 50].iter() {
        let registry = populated_registry(*instances, 10);

        group.bench_with_input(BenchmarkId::from_parameter(instances * 10), instances, |b, _| {
            b.iter(|| {
                black_box(registry.snapshot_all());
            });
        });
    }
    group.finish();
}

/// Benchmark a bulk query across all instances of a few series
fn bench_query_series(c: &mut Criterion) {
    let registry = populated_registry(20, 10);
    let query = SeriesQuery::series(["ns:jvm Series0", "ns:jvm Series5"]);

    c.bench_function("query_two_series", |b| {
        b.iter(|| {
            black_box(registry.query(black_box(&query)));
        });
    });
}

/// Benchmark serializing snapshots to the JSON wire format
fn bench_snapshot_to_json(c: &mut Criterion) {
    let registry = populated_registry(10, 10);
    let snapshots = registry.snapshot_all();

    c.bench_function("snapshot_to_json", |b| {
        b.iter(|| {
            black_box(serde_json::to_string(black_box(&snapshots)).unwrap());
        });
    });
}

/// Benchmark a full collection tick including ageing of silent keys
fn bench_tick_with_eviction(c: &mut Criterion) {
    c.bench_function("tick_with_eviction", |b| {
        b.iter_with_setup(
            || populated_registry(10, 10),
            |registry| {
                for _ in 0..4 {
                    black_box(registry.tick(Vec::new()));
                }
            },
        );
    });
}

criterion_group!(
    benches,
    bench_snapshot_single_dataset,
    bench_snapshot_all_varying_datasets,
    bench_query_series,
    bench_snapshot_to_json,
    bench_tick_with_eviction,
);
criterion_main!(benches);
