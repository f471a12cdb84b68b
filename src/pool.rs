use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Context};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::Result;

/// Fixed-size pool that runs one synchronous round at a time.
pub struct WorkerPool {
    pool: ThreadPool,
    num_workers: usize,
}

impl WorkerPool {
    pub fn new(num_workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|worker_id| format!("apriori-worker-{}", worker_id))
            .build()
            .context("failed to build worker pool")?;
        Ok(Self { pool, num_workers })
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Run `task` once per unit and return only after every task finished.
    ///
    /// A panicking task fails the whole round; whatever the other tasks wrote
    /// must be thrown away by the caller.
    pub fn round<T, F>(&self, label: &str, units: &[T], task: F) -> Result<()>
    where
        T: Sync,
        F: Fn(usize, &T) + Sync,
    {
        let task = &task;
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool.scope(|scope| {
                for (worker_id, unit) in units.iter().enumerate() {
                    scope.spawn(move |_| task(worker_id, unit));
                }
            })
        }))
        .map_err(|payload| {
            anyhow!(
                "{} round failed, a worker panicked: {}",
                label,
                panic_message(&*payload)
            )
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
