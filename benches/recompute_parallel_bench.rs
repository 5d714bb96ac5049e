//! Compare sequential vs parallel recompute of many fits.
//!
//! Run with: `cargo bench --bench recompute_parallel`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dogma::data::{Catalog, DEFAULT_CATALOG_PATH};
use dogma::engine::FitEngine;
use dogma::fit::AssemblySpec;
use dogma::parallel::{recompute_all, WorkerPool};

const FITS: usize = 256;

fn bench_sequential_vs_parallel(c: &mut Criterion) {
    let catalog = Catalog::load(DEFAULT_CATALOG_PATH).expect("shipped catalog");
    let specs = [
        AssemblySpec::load("data/fits/phoenix.json").expect("shipped fit"),
        AssemblySpec::load("data/fits/phoenix_passive.yaml").expect("shipped fit"),
    ];
    let fleet: Vec<FitEngine> = (0..FITS)
        .map(|i| FitEngine::from_spec(catalog.clone(), &specs[i % specs.len()]).expect("fit builds"))
        .collect();

    let mut group = c.benchmark_group("recompute_fleet");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter_batched(
            || fleet.clone(),
            |mut engines| {
                for engine in &mut engines {
                    let _ = black_box(engine.recompute().map(|s| s.passes()));
                }
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("parallel", |b| {
        let pool = WorkerPool::default();
        b.iter_batched(
            || fleet.clone(),
            |mut engines| black_box(recompute_all(&mut engines, &pool)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_sequential_vs_parallel);
criterion_main!(benches);
