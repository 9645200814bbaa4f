//! Bounded worker pool.
//!
//! [`WorkerPool`] spawns every submitted unit onto the tokio runtime straight
//! away, but a unit only starts doing work once it holds one of the pool's
//! permits. At most `max_workers` units therefore run at any one time, no
//! matter how many were submitted. [`WorkerPool::run_all`] is the only way to
//! get results back out, and it waits for every unit.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

pub struct WorkerPool<T> {
    permits: Arc<Semaphore>,
    max_workers: usize,
    units: JoinSet<T>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Create a pool running at most `max_workers` units at once. A pool
    /// always allows at least one unit to run.
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            units: JoinSet::new(),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Number of submitted units that have not been collected yet.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Submit a unit of work. The unit waits for a free permit before it
    /// starts; the permit is released when the unit finishes, whether it
    /// returns or panics.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, the same as [`tokio::spawn`].
    pub fn submit<F>(&mut self, unit: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.units.spawn(async move {
            // The semaphore is owned by the pool and never closed.
            let _permit = permits.acquire_owned().await.ok();
            unit.await
        });
    }

    /// Wait for every submitted unit to finish and return their results in
    /// completion order. A unit that panicked yields a [`JoinError`] in its
    /// place; the other units are unaffected.
    pub async fn run_all(mut self) -> Vec<Result<T, JoinError>> {
        let mut results = Vec::with_capacity(self.units.len());
        while let Some(result) = self.units.join_next().await {
            results.push(result);
        }
        results
    }
}
