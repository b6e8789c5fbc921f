//! Execution client probe over JSON-RPC.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint
//! - Query `eth_syncing` and the latest block header
//! - Decide whether a non-syncing client is actually at the chain head
//! - Handle timeouts and network errors without panicking

use alloy::eips::BlockNumberOrTag;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::SyncStatus;
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;

use crate::clients::types::{BlockSyncProgress, ClientError, ClientResult, ClientStatus};
use crate::clients::{ClientProbe, ExecutionClient};

/// A client that is not syncing is considered caught up only if its
/// latest block is no older than this.
pub const RECENT_BLOCK_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// True when a block produced at `block_timestamp` (unix seconds) is within
/// [`RECENT_BLOCK_THRESHOLD`] of `now`.
pub fn is_block_recent(block_timestamp: u64, now: SystemTime) -> bool {
    let now_secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    now_secs.saturating_sub(block_timestamp) <= RECENT_BLOCK_THRESHOLD.as_secs()
}

/// Execution client reached over HTTP JSON-RPC.
#[derive(Clone)]
pub struct RpcExecutionClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
    timeout_duration: Duration,
}

impl RpcExecutionClient {
    /// Create a client for `endpoint`.
    ///
    /// No request is made here; an unreachable client shows up on the
    /// first probe, not at construction.
    pub fn connect(endpoint: &str, timeout_duration: Duration) -> ClientResult<Self> {
        let url: url::Url = endpoint.parse().map_err(|e: url::ParseError| {
            ClientError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;
        let provider = ProviderBuilder::new().connect_http(url);

        tracing::debug!(endpoint = %endpoint, "Execution client configured");

        Ok(Self {
            provider: Arc::new(provider),
            endpoint: endpoint.to_string(),
            timeout_duration,
        })
    }

    async fn call<F, T, E>(&self, fut: F) -> ClientResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(ClientError::Rpc(e.to_string())),
            Err(_) => Err(ClientError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    async fn probe(&self) -> ClientResult<ClientStatus> {
        if let Some(progress) = self.sync_progress().await? {
            return Ok(ClientStatus::syncing(progress.fraction()));
        }

        // Not in syncing state, but it may still be behind the head.
        let block_timestamp = self.latest_block_timestamp().await?;
        if is_block_recent(block_timestamp, SystemTime::now()) {
            Ok(ClientStatus::synced())
        } else {
            tracing::debug!(
                endpoint = %self.endpoint,
                block_timestamp,
                "Execution client reports no sync but its latest block is stale"
            );
            Ok(ClientStatus::syncing(None))
        }
    }
}

#[async_trait]
impl ClientProbe for RpcExecutionClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn check_status(&self) -> ClientStatus {
        match self.probe().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Execution client probe failed");
                ClientStatus::failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ExecutionClient for RpcExecutionClient {
    async fn sync_progress(&self) -> ClientResult<Option<BlockSyncProgress>> {
        match self.call(self.provider.syncing()).await? {
            SyncStatus::Info(info) => Ok(Some(BlockSyncProgress {
                starting_block: info.starting_block.saturating_to::<u64>(),
                current_block: info.current_block.saturating_to::<u64>(),
                highest_block: info.highest_block.saturating_to::<u64>(),
            })),
            SyncStatus::None => Ok(None),
        }
    }

    async fn latest_block_timestamp(&self) -> ClientResult<u64> {
        let block = self
            .call(self.provider.get_block_by_number(BlockNumberOrTag::Latest))
            .await?
            .ok_or_else(|| ClientError::Malformed("latest block not found".to_string()))?;
        Ok(block.header.timestamp)
    }
}

impl std::fmt::Debug for RpcExecutionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcExecutionClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
