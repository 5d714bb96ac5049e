pub mod batch;
pub mod pool;

pub use batch::{recompute_all, recompute_all_with_progress, RecomputeOutcome};
pub use pool::{WorkerPool, ENV_WORKERS};
