//! External client probing subsystem.
//!
//! # Data Flow
//! ```text
//! Config (primary URL, optional fallback URL)
//!     → execution.rs (JSON-RPC: eth_syncing, latest block)
//!     → beacon.rs (Beacon API: /eth/v1/node/syncing)
//!     → pair.rs (primary + fallback, last snapshot)
//!     → readiness supervisor
//! ```
//!
//! # Design Decisions
//! - Probes never cache: every call hits the client
//! - `check_status` folds failures into `ClientStatus::error`
//! - Kind-specific sync queries surface errors as `ClientError`
//! - Every network call has a deadline

pub mod beacon;
pub mod execution;
pub mod pair;
pub mod types;

use async_trait::async_trait;

pub use beacon::BeaconHttpClient;
pub use execution::RpcExecutionClient;
pub use pair::ClientPair;
pub use types::{
    BeaconSyncStatus, BlockSyncProgress, ClientError, ClientKind, ClientResult, ClientStatus,
    PairStatus, UnknownClientKind,
};

/// Health snapshot of a single client instance.
#[async_trait]
pub trait ClientProbe: Send + Sync {
    /// Endpoint the probe talks to, for logging.
    fn endpoint(&self) -> &str;

    /// Query the client and summarize its state. Never fails; probe
    /// errors are reported through [`ClientStatus::error`].
    async fn check_status(&self) -> ClientStatus;
}

/// Sync queries specific to execution clients.
#[async_trait]
pub trait ExecutionClient: ClientProbe {
    /// Block-range progress, or `None` when the client is not in syncing state.
    async fn sync_progress(&self) -> ClientResult<Option<BlockSyncProgress>>;

    /// Timestamp (unix seconds) of the latest block the client knows about.
    async fn latest_block_timestamp(&self) -> ClientResult<u64>;
}

/// Sync queries specific to Beacon Nodes.
#[async_trait]
pub trait BeaconClient: ClientProbe {
    async fn sync_status(&self) -> ClientResult<BeaconSyncStatus>;
}
