//! Client readiness subsystem.
//!
//! # Data Flow
//! ```text
//! Task loop / request handler
//!     → supervisor.rs (per-kind lock, wait/poll/refresh loop)
//!     → ClientPair::evaluate (probe primary + fallback)
//!     → decision.rs (UsePrimary | UseFallback | WaitOn* | Unavailable)
//!     → poll.rs (poll the awaited client until synced)
//! ```
//!
//! # Design Decisions
//! - Decision table is a pure function of the pair snapshot
//! - Full re-evaluation every refresh interval, not just the awaited client
//! - Timeout is a result, cancellation and probe failures are errors

pub mod decision;
pub mod error;
pub mod poll;
pub mod state;
pub mod supervisor;

pub use decision::{decide, ClientTarget, ReadinessDecision, UnavailableReason};
pub use error::{ReadinessError, ReadinessResult};
pub use poll::{SyncPoll, SyncSource};
pub use state::ReadinessPhase;
pub use supervisor::{
    BeaconPair, ClientStatusReport, ExecutionPair, KindSupervisor, ReadinessSupervisor,
    SyncTimeout, BEACON_SYNC_TIMEOUT, EXECUTION_SYNC_TIMEOUT, STATUS_REFRESH_INTERVAL,
    SYNC_POLL_INTERVAL,
};
