//! Readiness supervisor: wait/poll/refresh protocol over both client pairs.
//!
//! # Responsibilities
//! - Serialize waits per client kind (one in-flight evaluation per kind)
//! - Decide between primary and fallback on every call
//! - Poll the awaited client until synced, timed out, or cancelled
//! - Re-run the full pair decision periodically to notice recovery or failure
//!
//! # Design Decisions
//! - Locks are owned by the supervisor instance, not process-wide statics
//! - A bounded wait that runs out is `Ok(false)`, not an error
//! - Cancellation is checked while acquiring the lock and while sleeping
//! - A bounded wait's budget covers queueing for the lock, so one-shot checks
//!   never sit behind an unbounded wait
//! - Probe errors end the wait; the caller decides whether to retry

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::clients::{BeaconClient, ClientKind, ClientPair, ExecutionClient, PairStatus};
use crate::lifecycle::shutdown::sleep_with_cancel;
use crate::observability::metrics;
use crate::readiness::decision::{ClientTarget, ReadinessDecision};
use crate::readiness::error::{ReadinessError, ReadinessResult};
use crate::readiness::poll::{SyncPoll, SyncSource};
use crate::readiness::state::{PhaseCell, ReadinessPhase};

/// Pause between polls of the awaited client.
pub const SYNC_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How often a wait re-runs the full primary/fallback decision.
pub const STATUS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Budget for one-shot execution client checks made by request handlers.
pub const EXECUTION_SYNC_TIMEOUT: Duration = Duration::from_secs(8);

/// Budget for one-shot Beacon Node checks made by request handlers.
pub const BEACON_SYNC_TIMEOUT: Duration = Duration::from_secs(8);

/// Execution client pair as held by the supervisor.
pub type ExecutionPair = ClientPair<dyn ExecutionClient>;

/// Beacon Node pair as held by the supervisor.
pub type BeaconPair = ClientPair<dyn BeaconClient>;

/// How long a wait may last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTimeout {
    /// Wait until ready, an error, or cancellation.
    Unbounded,
    /// Give up with `Ok(false)` once this much time has passed.
    After(Duration),
}

impl SyncTimeout {
    /// Build from a number of seconds, where `0` means [`SyncTimeout::Unbounded`].
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            SyncTimeout::Unbounded
        } else {
            SyncTimeout::After(Duration::from_secs(secs))
        }
    }

    pub fn limit(&self) -> Option<Duration> {
        match self {
            SyncTimeout::Unbounded => None,
            SyncTimeout::After(limit) => Some(*limit),
        }
    }
}

/// State guarded by the per-kind wait lock.
#[derive(Debug, Default)]
struct SyncState {
    /// Time of the last full primary/fallback evaluation.
    last_refresh: Option<Instant>,
}

/// Supervisor for one client kind.
pub struct KindSupervisor<C: ?Sized> {
    pair: Arc<ClientPair<C>>,
    state: Mutex<SyncState>,
    phase: PhaseCell,
}

impl<C: ?Sized + SyncSource> KindSupervisor<C> {
    pub fn new(pair: Arc<ClientPair<C>>) -> Self {
        Self {
            pair,
            state: Mutex::new(SyncState::default()),
            phase: PhaseCell::new(),
        }
    }

    pub fn kind(&self) -> ClientKind {
        self.pair.kind()
    }

    pub fn pair(&self) -> &Arc<ClientPair<C>> {
        &self.pair
    }

    pub fn phase(&self) -> ReadinessPhase {
        self.phase.get()
    }

    fn set_phase(&self, phase: ReadinessPhase) {
        let previous = self.phase.set(phase);
        if previous != phase {
            tracing::trace!(kind = %self.kind().as_str(), from = previous.as_str(), to = phase.as_str(), "Readiness phase changed");
            metrics::record_phase(self.kind(), phase);
        }
    }

    /// Single bounded check for request handlers.
    pub async fn require_synced(
        &self,
        cancel: &CancellationToken,
        budget: Duration,
    ) -> ReadinessResult<bool> {
        self.wait_synced(cancel, false, SyncTimeout::After(budget)).await
    }

    /// Wait for the primary or fallback client to be synced.
    ///
    /// Returns `Ok(true)` once a client is usable, `Ok(false)` if `timeout`
    /// elapses first, and an error if the pair is unavailable, a probe
    /// fails, or `cancel` fires. A bounded wait counts the time spent
    /// waiting for the per-kind lock against its budget; the phase is left
    /// to the lock holder when the budget runs out in the queue.
    pub async fn wait_synced(
        &self,
        cancel: &CancellationToken,
        verbose: bool,
        timeout: SyncTimeout,
    ) -> ReadinessResult<bool> {
        let kind = self.kind();
        let started = Instant::now();

        let lock = async {
            match timeout.limit() {
                Some(limit) => tokio::time::timeout(limit, self.state.lock()).await.ok(),
                None => Some(self.state.lock().await),
            }
        };
        let mut state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReadinessError::Cancelled { kind }),
            guard = lock => match guard {
                Some(guard) => guard,
                None => {
                    tracing::debug!(kind = %kind.as_str(), "Readiness wait timed out behind another wait");
                    metrics::record_wait(kind, "timeout", started.elapsed());
                    return Ok(false);
                }
            },
        };

        let timeout = match timeout {
            SyncTimeout::After(limit) => SyncTimeout::After(limit.saturating_sub(started.elapsed())),
            SyncTimeout::Unbounded => SyncTimeout::Unbounded,
        };
        let result = self.wait_locked(&mut state, cancel, verbose, timeout).await;
        drop(state);

        let (phase, outcome) = match &result {
            Ok(true) => (ReadinessPhase::Ready, "ready"),
            Ok(false) => (ReadinessPhase::Waiting, "timeout"),
            Err(e) if e.is_cancelled() => (ReadinessPhase::Idle, e.label()),
            Err(e) => (ReadinessPhase::Failed, e.label()),
        };
        self.set_phase(phase);
        metrics::record_wait(kind, outcome, started.elapsed());

        result
    }

    async fn wait_locked(
        &self,
        state: &mut SyncState,
        cancel: &CancellationToken,
        verbose: bool,
        timeout: SyncTimeout,
    ) -> ReadinessResult<bool> {
        let kind = self.kind();

        state.last_refresh = Some(Instant::now());
        let mut target = match self.evaluate().await? {
            Some(target) => target,
            None => return Ok(true),
        };

        let start = Instant::now();
        loop {
            if let Some(limit) = timeout.limit() {
                if start.elapsed() >= limit {
                    tracing::debug!(kind = %kind.as_str(), limit_secs = limit.as_secs(), "Readiness wait timed out");
                    return Ok(false);
                }
            }

            let refresh_due = state
                .last_refresh
                .map_or(true, |at| at.elapsed() > STATUS_REFRESH_INTERVAL);
            if refresh_due {
                tracing::info!("Refreshing primary / fallback {} status...", kind);
                state.last_refresh = Some(Instant::now());
                target = match self.evaluate().await? {
                    Some(target) => target,
                    None => return Ok(true),
                };
            }

            self.set_phase(ReadinessPhase::Checking);
            let client = self
                .pair
                .handle(target)
                .unwrap_or_else(|| self.pair.primary().clone());
            let poll = client
                .poll_sync(verbose)
                .await
                .map_err(|source| ReadinessError::Probe {
                    kind,
                    target: target.as_str(),
                    source,
                })?;
            if poll == SyncPoll::Synced {
                tracing::info!(kind = %kind.as_str(), target = target.as_str(), "{} is synced", kind);
                return Ok(true);
            }
            self.set_phase(ReadinessPhase::Waiting);

            let pause = match timeout.limit() {
                Some(limit) => SYNC_POLL_INTERVAL.min(limit.saturating_sub(start.elapsed())),
                None => SYNC_POLL_INTERVAL,
            };
            if sleep_with_cancel(cancel, pause).await {
                tracing::debug!(kind = %kind.as_str(), "Readiness wait cancelled");
                return Err(ReadinessError::Cancelled { kind });
            }
        }
    }

    /// Run the pair decision; `None` means ready, `Some` names the client to wait on.
    async fn evaluate(&self) -> ReadinessResult<Option<ClientTarget>> {
        let kind = self.kind();
        self.set_phase(ReadinessPhase::Checking);

        let decision = self.pair.evaluate().await;
        metrics::record_decision(kind, &decision);

        match &decision {
            ReadinessDecision::UsePrimary => {}
            ReadinessDecision::UseFallback {
                primary_error: Some(error),
                ..
            } => tracing::info!(
                error = %error,
                "Primary {kind} is unavailable, using fallback {kind}..."
            ),
            ReadinessDecision::UseFallback {
                primary_progress, ..
            } => tracing::info!(
                progress_pct = primary_progress.unwrap_or(0.0) * 100.0,
                "Primary {kind} is still syncing, using fallback {kind}..."
            ),
            ReadinessDecision::WaitOnPrimary { progress } => tracing::info!(
                progress_pct = progress.unwrap_or(0.0) * 100.0,
                "Fallback {kind} is not configured or unavailable, waiting for primary {kind} to finish syncing"
            ),
            ReadinessDecision::WaitOnFallback {
                primary_error,
                progress,
            } => tracing::info!(
                error = primary_error.as_deref().unwrap_or(""),
                progress_pct = progress.unwrap_or(0.0) * 100.0,
                "Primary {kind} is unavailable, waiting for fallback {kind} to finish syncing"
            ),
            ReadinessDecision::Unavailable(reason) => {
                let err = ReadinessError::Unavailable {
                    kind,
                    reason: reason.clone(),
                };
                tracing::warn!(error = %err, "No {kind} is ready");
                return Err(err);
            }
        }

        if decision.is_ready() {
            return Ok(None);
        }
        self.set_phase(ReadinessPhase::Waiting);
        Ok(decision.wait_target())
    }
}

/// Snapshot of both client pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatusReport {
    pub ec_manager_status: PairStatus,
    pub bc_manager_status: PairStatus,
}

/// Readiness supervisor for the execution and consensus client pairs.
///
/// Waits on the same kind are serialized; the two kinds are independent.
pub struct ReadinessSupervisor {
    execution: KindSupervisor<dyn ExecutionClient>,
    consensus: KindSupervisor<dyn BeaconClient>,
}

impl ReadinessSupervisor {
    pub fn new(execution: Arc<ExecutionPair>, consensus: Arc<BeaconPair>) -> Self {
        Self {
            execution: KindSupervisor::new(execution),
            consensus: KindSupervisor::new(consensus),
        }
    }

    pub fn execution(&self) -> &KindSupervisor<dyn ExecutionClient> {
        &self.execution
    }

    pub fn consensus(&self) -> &KindSupervisor<dyn BeaconClient> {
        &self.consensus
    }

    pub fn phase(&self, kind: ClientKind) -> ReadinessPhase {
        match kind {
            ClientKind::Execution => self.execution.phase(),
            ClientKind::Consensus => self.consensus.phase(),
        }
    }

    /// Wait for a client of `kind` to be synced. See [`KindSupervisor::wait_synced`].
    pub async fn wait_synced(
        &self,
        kind: ClientKind,
        cancel: &CancellationToken,
        verbose: bool,
        timeout: SyncTimeout,
    ) -> ReadinessResult<bool> {
        match kind {
            ClientKind::Execution => self.execution.wait_synced(cancel, verbose, timeout).await,
            ClientKind::Consensus => self.consensus.wait_synced(cancel, verbose, timeout).await,
        }
    }

    /// Wait with no timeout for the execution client pair.
    pub async fn wait_execution_synced(
        &self,
        cancel: &CancellationToken,
        verbose: bool,
    ) -> ReadinessResult<()> {
        self.execution
            .wait_synced(cancel, verbose, SyncTimeout::Unbounded)
            .await
            .map(|_| ())
    }

    /// Wait with no timeout for the Beacon Node pair.
    pub async fn wait_beacon_synced(
        &self,
        cancel: &CancellationToken,
        verbose: bool,
    ) -> ReadinessResult<()> {
        self.consensus
            .wait_synced(cancel, verbose, SyncTimeout::Unbounded)
            .await
            .map(|_| ())
    }

    /// Bounded check for `kind`; `Ok(false)` means still syncing after `budget`.
    pub async fn require_synced(
        &self,
        kind: ClientKind,
        cancel: &CancellationToken,
        budget: Duration,
    ) -> ReadinessResult<bool> {
        match kind {
            ClientKind::Execution => self.execution.require_synced(cancel, budget).await,
            ClientKind::Consensus => self.consensus.require_synced(cancel, budget).await,
        }
    }

    /// Gate an operation on `kind` being ready, with the kind's one-shot budget.
    ///
    /// The error names the blocking client pair and why.
    pub async fn require_node_ready(
        &self,
        kind: ClientKind,
        cancel: &CancellationToken,
    ) -> ReadinessResult<()> {
        let budget = match kind {
            ClientKind::Execution => EXECUTION_SYNC_TIMEOUT,
            ClientKind::Consensus => BEACON_SYNC_TIMEOUT,
        };
        if self.require_synced(kind, cancel, budget).await? {
            Ok(())
        } else {
            Err(ReadinessError::NotSynced { kind })
        }
    }

    /// Gate an operation on both client pairs being ready.
    pub async fn require_all_ready(&self, cancel: &CancellationToken) -> ReadinessResult<()> {
        self.require_node_ready(ClientKind::Execution, cancel).await?;
        self.require_node_ready(ClientKind::Consensus, cancel).await
    }

    /// Probe both pairs now and return their snapshots.
    pub async fn client_status(&self) -> ClientStatusReport {
        let (ec_manager_status, bc_manager_status) = tokio::join!(
            self.execution.pair().check_status(),
            self.consensus.pair().check_status()
        );
        ClientStatusReport {
            ec_manager_status,
            bc_manager_status,
        }
    }
}

impl std::fmt::Debug for ReadinessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessSupervisor")
            .field("execution", &self.execution.phase())
            .field("consensus", &self.consensus.phase())
            .finish()
    }
}
