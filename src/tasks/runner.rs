//! Periodic task loop gated on client readiness.
//!
//! # Responsibilities
//! - Wait for the execution and consensus pairs before every batch
//! - Run each scheduled task in order, logging failures
//! - Pause and retry when the clients are unavailable
//! - Exit promptly on cancellation
//!
//! # Design Decisions
//! - Readiness errors never end the loop; only cancellation does
//! - A failing task does not stop the rest of the batch
//! - Completion is tracked by the shutdown coordinator, once per loop

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::{sleep_with_cancel, Shutdown};
use crate::readiness::{ReadinessResult, ReadinessSupervisor};

/// Pause between batches.
pub const TASKS_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Pause after a readiness error before trying again.
pub const TASK_COOLDOWN: Duration = Duration::from_secs(10);

/// Work run by the task loop once both client pairs are ready.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, cancel: &CancellationToken) -> anyhow::Result<()>;
}

/// Background loop that runs scheduled tasks against synced clients only.
pub struct TaskLoop {
    supervisor: Arc<ReadinessSupervisor>,
    tasks: Vec<Arc<dyn ScheduledTask>>,
    /// Log sync progress on every poll of both waits.
    verbose: bool,
}

impl TaskLoop {
    pub fn new(supervisor: Arc<ReadinessSupervisor>) -> Self {
        Self {
            supervisor,
            tasks: Vec::new(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_task(mut self, task: Arc<dyn ScheduledTask>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Run the loop as a task tracked by `shutdown`.
    pub fn spawn(self, shutdown: &Shutdown) -> JoinHandle<()> {
        let cancel = shutdown.token();
        shutdown.spawn(self.run(cancel))
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            tasks = self.tasks.len(),
            interval_secs = TASKS_INTERVAL.as_secs(),
            verbose = self.verbose,
            "Task loop starting"
        );

        loop {
            if let Err(e) = self.wait_ready(&cancel).await {
                if e.is_cancelled() {
                    break;
                }
                tracing::error!(
                    error = %e,
                    cooldown_secs = TASK_COOLDOWN.as_secs(),
                    "Clients not ready, pausing before retry"
                );
                if sleep_with_cancel(&cancel, TASK_COOLDOWN).await {
                    break;
                }
                continue;
            }

            self.run_batch(&cancel).await;

            if sleep_with_cancel(&cancel, TASKS_INTERVAL).await {
                break;
            }
        }

        tracing::info!("Task loop stopped");
    }

    async fn wait_ready(&self, cancel: &CancellationToken) -> ReadinessResult<()> {
        self.supervisor
            .wait_execution_synced(cancel, self.verbose)
            .await?;
        self.supervisor.wait_beacon_synced(cancel, self.verbose).await
    }

    async fn run_batch(&self, cancel: &CancellationToken) {
        for task in &self.tasks {
            if cancel.is_cancelled() {
                return;
            }
            match task.run(cancel).await {
                Ok(()) => tracing::debug!(task = task.name(), "Task finished"),
                Err(e) => tracing::warn!(task = task.name(), error = %format!("{e:#}"), "Task failed"),
            }
        }
    }
}
