//! Beacon Node probe over the standard Beacon API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::clients::types::{BeaconSyncStatus, ClientError, ClientResult, ClientStatus};
use crate::clients::{BeaconClient, ClientProbe};

const SYNCING_PATH: &str = "eth/v1/node/syncing";

#[derive(Debug, Deserialize)]
struct SyncingResponse {
    data: SyncingData,
}

/// Slot numbers are quoted decimal strings in the Beacon API.
#[derive(Debug, Deserialize)]
struct SyncingData {
    head_slot: String,
    sync_distance: String,
    is_syncing: bool,
}

impl SyncingData {
    fn into_status(self) -> ClientResult<BeaconSyncStatus> {
        let head_slot: u64 = self
            .head_slot
            .parse()
            .map_err(|_| ClientError::Malformed(format!("head_slot '{}'", self.head_slot)))?;
        let sync_distance: u64 = self.sync_distance.parse().map_err(|_| {
            ClientError::Malformed(format!("sync_distance '{}'", self.sync_distance))
        })?;

        let target = head_slot.saturating_add(sync_distance);
        let progress = if target == 0 {
            0.0
        } else {
            head_slot as f64 / target as f64
        };

        Ok(BeaconSyncStatus {
            syncing: self.is_syncing,
            progress,
        })
    }
}

/// Beacon Node reached over HTTP.
#[derive(Debug, Clone)]
pub struct BeaconHttpClient {
    http: reqwest::Client,
    base: url::Url,
    endpoint: String,
}

impl BeaconHttpClient {
    pub fn new(endpoint: &str, timeout: Duration) -> ClientResult<Self> {
        // A trailing slash makes `join` append instead of replacing the last segment.
        let normalized = format!("{}/", endpoint.trim_end_matches('/'));
        let base = url::Url::parse(&normalized).map_err(|e| ClientError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ClientProbe for BeaconHttpClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn check_status(&self) -> ClientStatus {
        match self.sync_status().await {
            Ok(status) if status.syncing => ClientStatus::syncing(Some(status.progress)),
            Ok(_) => ClientStatus::synced(),
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Beacon Node probe failed");
                ClientStatus::failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl BeaconClient for BeaconHttpClient {
    async fn sync_status(&self) -> ClientResult<BeaconSyncStatus> {
        let url = self
            .base
            .join(SYNCING_PATH)
            .map_err(|e| ClientError::InvalidEndpoint {
                url: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let response: SyncingResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.data.into_status()
    }
}
