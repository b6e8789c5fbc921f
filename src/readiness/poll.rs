//! Single-client sync polling used inside the wait loop.
//!
//! Execution clients report a block range while syncing and nothing once
//! done; a client that has stopped reporting is checked against wall-clock
//! time through its latest block. Beacon Nodes always report explicitly.

use async_trait::async_trait;
use std::time::SystemTime;

use crate::clients::execution::is_block_recent;
use crate::clients::{BeaconClient, ClientProbe, ClientResult, ExecutionClient};

/// Result of polling the client currently being waited on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncPoll {
    Synced,
    Syncing { progress: Option<f64> },
}

/// A client that can be polled for sync completion.
#[async_trait]
pub trait SyncSource: ClientProbe {
    async fn poll_sync(&self, verbose: bool) -> ClientResult<SyncPoll>;
}

#[async_trait]
impl SyncSource for dyn ExecutionClient {
    async fn poll_sync(&self, verbose: bool) -> ClientResult<SyncPoll> {
        match self.sync_progress().await? {
            Some(progress) => {
                let fraction = progress.fraction();
                if verbose {
                    match fraction {
                        Some(p) => tracing::info!(
                            endpoint = %self.endpoint(),
                            progress_pct = p * 100.0,
                            "Execution client syncing"
                        ),
                        None => tracing::info!(endpoint = %self.endpoint(), "Execution client syncing"),
                    }
                }
                Ok(SyncPoll::Syncing { progress: fraction })
            }
            None => {
                let block_timestamp = self.latest_block_timestamp().await?;
                if is_block_recent(block_timestamp, SystemTime::now()) {
                    Ok(SyncPoll::Synced)
                } else {
                    if verbose {
                        tracing::info!(
                            endpoint = %self.endpoint(),
                            block_timestamp,
                            "Execution client is not syncing but its latest block is stale"
                        );
                    }
                    Ok(SyncPoll::Syncing { progress: None })
                }
            }
        }
    }
}

#[async_trait]
impl SyncSource for dyn BeaconClient {
    async fn poll_sync(&self, verbose: bool) -> ClientResult<SyncPoll> {
        let status = self.sync_status().await?;
        if !status.syncing {
            return Ok(SyncPoll::Synced);
        }
        if verbose {
            tracing::info!(
                endpoint = %self.endpoint(),
                progress_pct = status.progress * 100.0,
                "Beacon Node syncing"
            );
        }
        Ok(SyncPoll::Syncing {
            progress: Some(status.progress),
        })
    }
}
