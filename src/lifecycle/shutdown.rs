//! Shutdown coordination for the daemon.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Coordinator for graceful shutdown.
///
/// Holds the process-wide cancellation token every blocking call observes,
/// and tracks long-running tasks so shutdown can wait for them to finish.
#[derive(Debug, Clone)]
pub struct Shutdown {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Cancellation token to thread through blocking calls.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Spawn a task whose completion shutdown will wait for.
    ///
    /// Completion is recorded exactly once, when the task's future finishes
    /// or is dropped, whichever way it exits.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// Number of tracked tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting new tasks and wait for tracked tasks to finish.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Like [`Shutdown::wait`] with a deadline; returns false if tasks were still running.
    pub async fn wait_with_timeout(&self, deadline: Duration) -> bool {
        match tokio::time::timeout(deadline, self.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    remaining = self.active_tasks(),
                    deadline_secs = deadline.as_secs(),
                    "Shutdown deadline reached with tasks still running"
                );
                false
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// Returns true if the sleep was cut short by cancellation.
pub async fn sleep_with_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
