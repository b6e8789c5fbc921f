//! Readiness error taxonomy.

use thiserror::Error;

use crate::clients::{ClientError, ClientKind};
use crate::readiness::decision::UnavailableReason;

/// Errors surfaced by the readiness supervisor.
///
/// A bounded wait that runs out of time is not an error; `wait_synced`
/// reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// Neither primary nor fallback can be used or waited on.
    #[error("{}", unavailable_message(*kind, reason))]
    Unavailable {
        kind: ClientKind,
        reason: UnavailableReason,
    },

    /// Querying a specific client failed mid-wait.
    #[error("error checking {target} {kind} sync progress: {source}")]
    Probe {
        kind: ClientKind,
        target: &'static str,
        #[source]
        source: ClientError,
    },

    /// A one-shot readiness check ran out of budget while the client was still syncing.
    #[error("The {kind} is currently syncing. Please try again later.")]
    NotSynced { kind: ClientKind },

    /// The shared cancellation signal fired.
    #[error("wait for {kind} readiness was cancelled")]
    Cancelled { kind: ClientKind },
}

impl ReadinessError {
    pub fn kind(&self) -> ClientKind {
        match self {
            ReadinessError::Unavailable { kind, .. }
            | ReadinessError::Probe { kind, .. }
            | ReadinessError::NotSynced { kind }
            | ReadinessError::Cancelled { kind } => *kind,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReadinessError::Cancelled { .. })
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ReadinessError::Unavailable { .. } => "unavailable",
            ReadinessError::Probe { .. } => "probe_error",
            ReadinessError::NotSynced { .. } => "not_synced",
            ReadinessError::Cancelled { .. } => "cancelled",
        }
    }
}

fn unavailable_message(kind: ClientKind, reason: &UnavailableReason) -> String {
    let name = kind.display_name();
    match &reason.fallback_error {
        Some(fallback_error) => format!(
            "Primary {name} is unavailable ({}) and fallback {name} is unavailable ({fallback_error}), no {name}s are ready.",
            reason.primary_error
        ),
        None => format!(
            "Primary {name} is unavailable ({}) and no fallback {name} is configured.",
            reason.primary_error
        ),
    }
}

/// Result type for readiness operations.
pub type ReadinessResult<T> = Result<T, ReadinessError>;
