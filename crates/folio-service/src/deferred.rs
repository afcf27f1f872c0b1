//! Detached cleanup work that runs after the caller has its result.

use std::future::Future;

use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info_span};

/// Tracks fire-and-forget cleanup tasks.
///
/// Work spawned here is never awaited by the operation that scheduled it,
/// is not retried and is not persisted: if the process exits first, the
/// work is lost. [`DeferredCleanup::drain`] waits for everything in flight.
#[derive(Debug, Clone)]
pub struct DeferredCleanup {
    tracker: TaskTracker,
}

impl Default for DeferredCleanup {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredCleanup {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
        }
    }

    /// Run `work` in the background under a span named after `task`.
    pub fn spawn<F>(&self, task: &'static str, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(task, "Scheduling deferred cleanup");
        self.tracker
            .spawn(work.instrument(info_span!("deferred", task)));
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every in-flight task to finish.
    ///
    /// The tracker accepts new work again once this returns.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
