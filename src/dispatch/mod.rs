use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use rayon::prelude::*;

use crate::foundation::error::{ViewgridError, ViewgridResult};

pub const DEFAULT_THREADS: usize = 10;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DispatchOpts {
    pub parallel: bool,
    /// Worker count of the pool used when `parallel` is set.
    pub threads: usize,
}

impl Default for DispatchOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: DEFAULT_THREADS,
        }
    }
}

impl DispatchOpts {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ViewgridResult<()> {
        if self.threads == 0 {
            return Err(ViewgridError::invalid_arguments(
                "dispatch thread count must be >= 1",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub total: usize,
    pub succeeded: usize,
}

/// Completed-job counter shared by all workers of a batch.
#[derive(Debug)]
pub struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
        }
    }

    /// Records one completed job and returns the new count.
    pub fn tick(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!("{done}/{}", self.total);
        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Runs `job` once for every item, sequentially or on a dedicated pool.
///
/// Failures do not stop the batch: every item runs, each failure is logged with its item,
/// and the batch then fails with [`ViewgridError::BatchFailed`] naming the first failure in
/// item order.
pub fn dispatch<T, F>(
    items: &[T],
    opts: &DispatchOpts,
    progress: &Progress,
    job: F,
) -> ViewgridResult<DispatchStats>
where
    T: fmt::Display + Sync,
    F: Fn(&T) -> ViewgridResult<()> + Sync,
{
    opts.validate()?;
    tracing::info!(
        jobs = items.len(),
        parallel = opts.parallel,
        threads = opts.threads,
        "dispatching"
    );

    let run_one = |item: &T| {
        let res = job(item);
        if let Err(e) = &res {
            tracing::error!(item = %item, error = %e, "job failed");
            if let Some(output) = e.captured_output()
                && !output.trim().is_empty()
            {
                tracing::error!(item = %item, "captured output:\n{output}");
            }
        }
        progress.tick();
        res
    };

    let results: Vec<ViewgridResult<()>> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| items.par_iter().map(run_one).collect())
    } else {
        items.iter().map(run_one).collect()
    };

    let total = results.len();
    let mut failures = results.into_iter().filter_map(Result::err);
    let Some(first) = failures.next() else {
        return Ok(DispatchStats {
            total,
            succeeded: total,
        });
    };
    let failed = 1 + failures.count();
    Err(ViewgridError::BatchFailed {
        failed,
        total,
        first: first.to_string(),
    })
}

fn build_thread_pool(threads: usize) -> ViewgridResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("viewgrid-worker-{i}"))
        .build()
        .map_err(|e| ViewgridError::invalid_arguments(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/mod.rs"]
mod tests;
