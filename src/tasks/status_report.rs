//! Task that logs the state of both client pairs.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::clients::{ClientKind, PairStatus};
use crate::readiness::ReadinessSupervisor;
use crate::tasks::runner::ScheduledTask;

pub struct StatusLogTask {
    supervisor: Arc<ReadinessSupervisor>,
}

impl StatusLogTask {
    pub fn new(supervisor: Arc<ReadinessSupervisor>) -> Self {
        Self { supervisor }
    }
}

fn log_pair(kind: ClientKind, status: &PairStatus) {
    let primary = &status.primary_client_status;
    let fallback = &status.fallback_client_status;
    tracing::info!(
        kind = kind.as_str(),
        primary_working = primary.is_working,
        primary_synced = primary.is_synced,
        primary_progress_pct = primary.progress_percent(),
        primary_error = primary.error_text(),
        fallback_enabled = status.fallback_enabled,
        fallback_synced = fallback.is_synced,
        fallback_error = fallback.error_text(),
        "Client pair status"
    );
}

#[async_trait]
impl ScheduledTask for StatusLogTask {
    fn name(&self) -> &str {
        "client-status-log"
    }

    async fn run(&self, _cancel: &CancellationToken) -> anyhow::Result<()> {
        let report = self.supervisor.client_status().await;
        log_pair(ClientKind::Execution, &report.ec_manager_status);
        log_pair(ClientKind::Consensus, &report.bc_manager_status);
        Ok(())
    }
}
