//! Recompute many independent fits in parallel.
//!
//! Each [FitEngine] owns its store; the catalog is shared read-only, so fits
//! can be recomputed on any worker without locks.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::engine::{FitEngine, FitId};
use crate::error::EngineError;
use crate::parallel::pool::WorkerPool;

/// Outcome of one fit in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeOutcome {
    pub fit: FitId,
    pub passes: Result<usize, EngineError>,
}

/// Recompute every engine in place, in parallel. Results follow input order.
pub fn recompute_all(engines: &mut [FitEngine], pool: &WorkerPool) -> Vec<RecomputeOutcome> {
    recompute_all_with_progress(engines, pool, |_, _| {})
}

/// Like [recompute_all], calling `on_progress(done, total)` as fits finish.
pub fn recompute_all_with_progress<P>(
    engines: &mut [FitEngine],
    pool: &WorkerPool,
    on_progress: P,
) -> Vec<RecomputeOutcome>
where
    P: Fn(usize, usize) + Sync,
{
    let total = engines.len();
    let done = AtomicUsize::new(0);
    let outcomes = pool.install(|| {
        engines
            .par_iter_mut()
            .map(|engine| {
                let passes = engine.recompute().map(|snapshot| snapshot.passes());
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                on_progress(finished, total);
                RecomputeOutcome {
                    fit: engine.id(),
                    passes,
                }
            })
            .collect::<Vec<_>>()
    });

    let failed = outcomes.iter().filter(|o| o.passes.is_err()).count();
    tracing::info!(fits = total, failed, "batch recompute finished");
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_recomputes_nothing() {
        let mut engines: Vec<FitEngine> = Vec::new();
        assert!(recompute_all(&mut engines, &WorkerPool::default()).is_empty());
    }
}
