//! Sizing of the rayon pool that batch recomputes run on.

use std::num::NonZeroUsize;

use rayon::ThreadPoolBuilder;

use crate::config::env_parse;

/// Thread count for batch recomputes; unset means the global rayon pool.
pub const ENV_WORKERS: &str = "DOGMA_WORKERS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    threads: Option<NonZeroUsize>,
}

impl WorkerPool {
    /// `0` selects the global pool.
    pub fn with_workers(threads: usize) -> Self {
        Self {
            threads: NonZeroUsize::new(threads),
        }
    }

    /// Reads `DOGMA_WORKERS`; missing or unparsable values select the global pool.
    pub fn from_env() -> Self {
        Self::with_workers(env_parse(ENV_WORKERS).unwrap_or(0))
    }

    pub fn threads(&self) -> Option<usize> {
        self.threads.map(NonZeroUsize::get)
    }

    /// Run `f` inside a dedicated pool of the configured size. Falls back to
    /// the global pool if that pool cannot be built.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        let Some(threads) = self.threads else {
            return f();
        };
        match ThreadPoolBuilder::new().num_threads(threads.get()).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(threads = threads.get(), %err, "falling back to the global rayon pool");
                f()
            }
        }
    }
}
