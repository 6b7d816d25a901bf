use anyhow::Result;
#[cfg(not(feature = "mt"))]
use tracing::warn;

#[cfg(feature = "mt")]
use rayon::prelude::*;

/// Patient-level fan-out settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fanout {
    pub parallel: bool,
    /// Worker threads, 0 = rayon default.
    pub threads: usize,
}

impl Fanout {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn new(parallel: bool, threads: usize) -> Self {
        #[cfg(not(feature = "mt"))]
        if parallel {
            warn!("parallel requested but built without feature 'mt'; running sequentially");
        }
        Self { parallel, threads }
    }

    pub fn is_parallel(&self) -> bool {
        cfg!(feature = "mt") && self.parallel
    }

    /// Maps `f` over `0..n`, returning results in index order.
    pub fn map_indexed<R, F>(&self, n: usize, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> Result<R> + Sync + Send,
    {
        #[cfg(feature = "mt")]
        {
            if self.parallel {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.threads)
                    .build()
                    .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
                return pool.install(|| (0..n).into_par_iter().map(&f).collect());
            }
        }
        (0..n).map(f).collect()
    }
}
