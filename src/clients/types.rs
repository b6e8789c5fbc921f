//! Client status types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two kinds of external client the node depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Execution layer client (JSON-RPC).
    Execution,
    /// Consensus layer client (Beacon API).
    Consensus,
}

impl ClientKind {
    /// Short label used for metrics and API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Execution => "execution",
            ClientKind::Consensus => "consensus",
        }
    }

    /// Human-readable client name used in log lines and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ClientKind::Execution => "execution client",
            ClientKind::Consensus => "Beacon Node",
        }
    }
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A client kind label that matches neither kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown client kind '{0}'")]
pub struct UnknownClientKind(pub String);

impl std::str::FromStr for ClientKind {
    type Err = UnknownClientKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "execution" | "ec" | "eth1" => Ok(ClientKind::Execution),
            "consensus" | "beacon" | "bc" | "eth2" => Ok(ClientKind::Consensus),
            other => Err(UnknownClientKind(other.to_string())),
        }
    }
}

/// Snapshot of a single client instance, produced fresh on every probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatus {
    /// The client answered the probe.
    pub is_working: bool,
    /// The client is caught up with the network head.
    pub is_synced: bool,
    /// Fraction in [0, 1], when the client reports one.
    pub sync_progress: Option<f64>,
    /// Probe failure description, if any.
    pub error: Option<String>,
}

impl ClientStatus {
    /// Status of a client that answered and is fully synced.
    pub fn synced() -> Self {
        Self {
            is_working: true,
            is_synced: true,
            sync_progress: Some(1.0),
            error: None,
        }
    }

    /// Status of a client that answered but is still catching up.
    pub fn syncing(progress: Option<f64>) -> Self {
        Self {
            is_working: true,
            is_synced: false,
            sync_progress: progress,
            error: None,
        }
    }

    /// Status of a client that could not be probed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_working: false,
            is_synced: false,
            sync_progress: None,
            error: Some(error.into()),
        }
    }

    /// True when the client answered and reported no error.
    pub fn is_reachable(&self) -> bool {
        self.is_working && self.error.as_deref().map_or(true, str::is_empty)
    }

    /// Error text for diagnostics; empty when none was reported.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }

    /// Sync progress as a percentage, for log lines.
    pub fn progress_percent(&self) -> f64 {
        self.sync_progress.unwrap_or(0.0) * 100.0
    }
}

/// Combined snapshot of a primary/fallback pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStatus {
    pub primary_client_status: ClientStatus,
    /// Zero value when no fallback is configured.
    pub fallback_client_status: ClientStatus,
    pub fallback_enabled: bool,
}

impl PairStatus {
    pub fn is_primary_ready(&self) -> bool {
        self.primary_client_status.is_synced
    }

    pub fn is_fallback_ready(&self) -> bool {
        self.fallback_enabled && self.fallback_client_status.is_synced
    }
}

/// Block-range sync progress reported by an execution client (`eth_syncing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSyncProgress {
    pub starting_block: u64,
    pub current_block: u64,
    pub highest_block: u64,
}

impl BlockSyncProgress {
    /// Fraction of the block range processed.
    ///
    /// Returns `None` when the range is empty or the client reports a
    /// current block past the highest one it knows about.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.highest_block.checked_sub(self.starting_block)?;
        if total == 0 {
            return None;
        }
        let done = self.current_block.saturating_sub(self.starting_block);
        let fraction = done as f64 / total as f64;
        if fraction > 1.0 {
            None
        } else {
            Some(fraction)
        }
    }
}

/// Sync state reported by a Beacon Node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeaconSyncStatus {
    pub syncing: bool,
    pub progress: f64,
}

/// Errors that can occur while probing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Endpoint URL could not be parsed.
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// HTTP transport or status error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result type for probe operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        let progress = BlockSyncProgress {
            starting_block: 100,
            current_block: 142,
            highest_block: 200,
        };
        let fraction = progress.fraction().unwrap();
        assert!((fraction - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_progress_fraction_empty_range() {
        let progress = BlockSyncProgress {
            starting_block: 10,
            current_block: 10,
            highest_block: 10,
        };
        assert_eq!(progress.fraction(), None);

        let ahead = BlockSyncProgress {
            starting_block: 0,
            current_block: 20,
            highest_block: 10,
        };
        assert_eq!(ahead.fraction(), None);
    }

    #[test]
    fn test_reachable_requires_empty_error() {
        assert!(ClientStatus::syncing(Some(0.5)).is_reachable());
        assert!(!ClientStatus::failed("connection refused").is_reachable());

        let mut odd = ClientStatus::synced();
        odd.error = Some("stale head".into());
        assert!(!odd.is_reachable());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("execution".parse::<ClientKind>().unwrap(), ClientKind::Execution);
        assert_eq!("Beacon".parse::<ClientKind>().unwrap(), ClientKind::Consensus);
        assert_eq!(
            "validator".parse::<ClientKind>(),
            Err(UnknownClientKind("validator".to_string()))
        );
    }

    #[test]
    fn test_pair_status_serializes_camel_case() {
        let status = PairStatus {
            primary_client_status: ClientStatus::synced(),
            fallback_client_status: ClientStatus::default(),
            fallback_enabled: false,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["primaryClientStatus"]["isSynced"], true);
        assert_eq!(json["fallbackEnabled"], false);
    }

    #[test]
    fn test_fallback_ready_requires_enabled() {
        let status = PairStatus {
            primary_client_status: ClientStatus::syncing(None),
            fallback_client_status: ClientStatus::synced(),
            fallback_enabled: false,
        };
        assert!(!status.is_fallback_ready());
    }
}
