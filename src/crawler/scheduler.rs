//! Bounded work pool for crawl tasks
//!
//! This module handles:
//! - The `WorkItem` unit of work
//! - Spawning work onto the tokio runtime
//! - Global concurrency limiting via a semaphore
//! - Tracking outstanding work until the pool drains

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// A URL waiting to be fetched, parsed and expanded
///
/// Created only by the caller that won the URL in the visited set, and
/// consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// The URL to process
    pub url: String,
}

impl WorkItem {
    /// Creates a work item
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Pool of spawned work with a cap on how much of it runs at once
///
/// Every dispatched future is spawned immediately, but it only starts once it
/// holds one of `concurrency` permits, so at most `concurrency` bodies run in
/// parallel. The pool is drained when [`WorkPool::next_completed`] returns
/// `None`; the number of spawned-but-unfinished tasks is
/// [`WorkPool::outstanding`].
pub struct WorkPool<T> {
    /// Spawned tasks that have not been reaped
    tasks: JoinSet<T>,

    /// Semaphore for limiting concurrent bodies
    permits: Arc<Semaphore>,
}

impl<T: Send + 'static> WorkPool<T> {
    /// Creates a pool running at most `concurrency` bodies at once
    pub fn new(concurrency: usize) -> Self {
        Self {
            tasks: JoinSet::new(),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Spawns `work`; its body runs once a permit is free
    pub fn dispatch<F>(&mut self, work: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permits = self.permits.clone();
        self.tasks.spawn(async move {
            // The semaphore is never closed, so acquisition only waits
            let _permit = permits.acquire_owned().await.ok();
            work.await
        });
    }

    /// Waits for the next task to finish
    ///
    /// # Returns
    ///
    /// * `Some(Ok(T))` - A task finished
    /// * `Some(Err(JoinError))` - A task panicked or was aborted
    /// * `None` - No work is outstanding
    pub async fn next_completed(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    /// Returns the number of tasks spawned but not yet reaped
    pub fn outstanding(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether all work has drained
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
