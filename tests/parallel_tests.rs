use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dogma::data::{Catalog, DEFAULT_CATALOG_PATH};
use dogma::engine::FitEngine;
use dogma::fit::{AssemblySpec, ModuleState};
use dogma::parallel::{recompute_all, recompute_all_with_progress, WorkerPool};

fn engines(catalog: &Arc<Catalog>, count: usize) -> Vec<FitEngine> {
    let specs = [
        AssemblySpec::load("data/fits/phoenix.json").unwrap(),
        AssemblySpec::load("data/fits/phoenix_passive.yaml").unwrap(),
    ];
    (0..count)
        .map(|i| {
            let mut engine = FitEngine::from_spec(Arc::clone(catalog), &specs[i % specs.len()]).unwrap();
            // Vary the fits a little so results differ between engines.
            if i % 3 == 0 {
                let first = engine.assembly().modules().next().map(|entry| entry.id).unwrap();
                engine.set_module_state(first, ModuleState::Offline).unwrap();
            }
            engine
        })
        .collect()
}

#[test]
fn parallel_recompute_matches_sequential() {
    let catalog = Catalog::load(DEFAULT_CATALOG_PATH).unwrap();

    let mut parallel = engines(&catalog, 12);
    let mut sequential = parallel.clone();
    for engine in &mut sequential {
        engine.recompute().unwrap();
    }
    assert!(parallel.iter().all(FitEngine::is_dirty));

    let outcomes = recompute_all(&mut parallel, &WorkerPool::with_workers(4));

    assert_eq!(outcomes.len(), sequential.len());
    for ((outcome, par), seq) in outcomes.iter().zip(&parallel).zip(&sequential) {
        assert_eq!(outcome.fit, par.id());
        assert!(outcome.passes.is_ok());
        assert!(!par.is_dirty());
        assert_eq!(
            par.snapshot().map(|s| s.values()),
            seq.snapshot().map(|s| s.values())
        );
    }
}

#[test]
fn progress_reaches_total() {
    let catalog = Catalog::load(DEFAULT_CATALOG_PATH).unwrap();
    let mut fits = engines(&catalog, 5);
    let calls = AtomicUsize::new(0);
    let highest = AtomicUsize::new(0);

    let outcomes = recompute_all_with_progress(&mut fits, &WorkerPool::default(), |done, total| {
        assert_eq!(total, 5);
        calls.fetch_add(1, Ordering::Relaxed);
        highest.fetch_max(done, Ordering::Relaxed);
    });

    assert_eq!(outcomes.len(), 5);
    assert_eq!(calls.load(Ordering::Relaxed), 5);
    assert_eq!(highest.load(Ordering::Relaxed), 5);
}
