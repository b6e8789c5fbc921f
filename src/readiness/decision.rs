//! Primary/fallback decision table.
//!
//! # Table
//! ```text
//! primary synced                          → UsePrimary
//! fallback enabled + synced               → UseFallback
//! primary reachable                       → WaitOnPrimary
//! fallback enabled + reachable            → WaitOnFallback
//! otherwise                               → Unavailable
//! ```
//!
//! Deterministic per call; no history is consulted.

use serde::Serialize;

use crate::clients::PairStatus;

/// Which instance of a pair a decision refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientTarget {
    Primary,
    Fallback,
}

impl ClientTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientTarget::Primary => "primary",
            ClientTarget::Fallback => "fallback",
        }
    }
}

/// Why neither client of a pair can be used or waited on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableReason {
    pub primary_error: String,
    /// `None` when no fallback is configured.
    pub fallback_error: Option<String>,
}

/// Outcome of evaluating a [`PairStatus`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadinessDecision {
    UsePrimary,
    /// Primary is bypassed; carries its state for the informational note.
    UseFallback {
        primary_error: Option<String>,
        primary_progress: Option<f64>,
    },
    WaitOnPrimary {
        progress: Option<f64>,
    },
    WaitOnFallback {
        primary_error: Option<String>,
        progress: Option<f64>,
    },
    Unavailable(UnavailableReason),
}

impl ReadinessDecision {
    /// True for `UsePrimary` and `UseFallback`.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            ReadinessDecision::UsePrimary | ReadinessDecision::UseFallback { .. }
        )
    }

    /// The client to keep polling, for the two waiting outcomes.
    pub fn wait_target(&self) -> Option<ClientTarget> {
        match self {
            ReadinessDecision::WaitOnPrimary { .. } => Some(ClientTarget::Primary),
            ReadinessDecision::WaitOnFallback { .. } => Some(ClientTarget::Fallback),
            _ => None,
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ReadinessDecision::UsePrimary => "use_primary",
            ReadinessDecision::UseFallback { .. } => "use_fallback",
            ReadinessDecision::WaitOnPrimary { .. } => "wait_on_primary",
            ReadinessDecision::WaitOnFallback { .. } => "wait_on_fallback",
            ReadinessDecision::Unavailable(_) => "unavailable",
        }
    }
}

fn non_empty(error: &Option<String>) -> Option<String> {
    error.as_ref().filter(|e| !e.is_empty()).cloned()
}

/// Decide which client of a pair to use, wait on, or report as unavailable.
pub fn decide(status: &PairStatus) -> ReadinessDecision {
    let primary = &status.primary_client_status;
    let fallback = &status.fallback_client_status;

    if status.is_primary_ready() {
        return ReadinessDecision::UsePrimary;
    }

    if status.is_fallback_ready() {
        return ReadinessDecision::UseFallback {
            primary_error: non_empty(&primary.error),
            primary_progress: primary.sync_progress,
        };
    }

    if primary.is_reachable() {
        return ReadinessDecision::WaitOnPrimary {
            progress: primary.sync_progress,
        };
    }

    if status.fallback_enabled && fallback.is_reachable() {
        return ReadinessDecision::WaitOnFallback {
            primary_error: non_empty(&primary.error),
            progress: fallback.sync_progress,
        };
    }

    ReadinessDecision::Unavailable(UnavailableReason {
        primary_error: primary.error_text().to_string(),
        fallback_error: status
            .fallback_enabled
            .then(|| fallback.error_text().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientStatus;

    fn pair(primary: ClientStatus, fallback: Option<ClientStatus>) -> PairStatus {
        PairStatus {
            primary_client_status: primary,
            fallback_enabled: fallback.is_some(),
            fallback_client_status: fallback.unwrap_or_default(),
        }
    }

    fn all_statuses() -> Vec<ClientStatus> {
        vec![
            ClientStatus::synced(),
            ClientStatus::syncing(Some(0.3)),
            ClientStatus::syncing(None),
            ClientStatus::failed("connection refused"),
            ClientStatus::default(),
        ]
    }

    #[test]
    fn test_synced_primary_always_wins() {
        for fallback in all_statuses().into_iter().map(Some).chain([None]) {
            let status = pair(ClientStatus::synced(), fallback);
            assert_eq!(decide(&status), ReadinessDecision::UsePrimary);
        }
    }

    #[test]
    fn test_synced_fallback_used_when_primary_not_synced() {
        for primary in all_statuses().into_iter().filter(|s| !s.is_synced) {
            let status = pair(primary.clone(), Some(ClientStatus::synced()));
            assert!(
                matches!(decide(&status), ReadinessDecision::UseFallback { .. }),
                "primary {:?} should yield to a synced fallback",
                primary
            );
        }
    }

    #[test]
    fn test_use_fallback_carries_primary_error() {
        let status = pair(ClientStatus::failed("timeout"), Some(ClientStatus::synced()));
        assert_eq!(
            decide(&status),
            ReadinessDecision::UseFallback {
                primary_error: Some("timeout".into()),
                primary_progress: None,
            }
        );
    }

    #[test]
    fn test_wait_on_syncing_primary() {
        let status = pair(ClientStatus::syncing(Some(0.42)), None);
        assert_eq!(
            decide(&status),
            ReadinessDecision::WaitOnPrimary {
                progress: Some(0.42)
            }
        );

        let recovered = pair(ClientStatus::synced(), None);
        assert_eq!(decide(&recovered), ReadinessDecision::UsePrimary);
    }

    #[test]
    fn test_wait_on_primary_preferred_over_syncing_fallback() {
        let status = pair(
            ClientStatus::syncing(Some(0.1)),
            Some(ClientStatus::syncing(Some(0.9))),
        );
        assert_eq!(decide(&status).wait_target(), Some(ClientTarget::Primary));
    }

    #[test]
    fn test_ready_decisions_have_no_wait_target() {
        let use_fallback = decide(&pair(
            ClientStatus::failed("connection refused"),
            Some(ClientStatus::synced()),
        ));
        assert!(use_fallback.is_ready());
        assert_eq!(use_fallback.wait_target(), None);

        let waiting = decide(&pair(ClientStatus::syncing(None), None));
        assert!(!waiting.is_ready());

        let unavailable = decide(&pair(ClientStatus::failed("down"), None));
        assert!(!unavailable.is_ready());
        assert_eq!(unavailable.wait_target(), None);
    }

    #[test]
    fn test_wait_on_fallback_when_primary_down() {
        let status = pair(
            ClientStatus::failed("connection refused"),
            Some(ClientStatus::syncing(Some(0.5))),
        );
        assert_eq!(
            decide(&status),
            ReadinessDecision::WaitOnFallback {
                primary_error: Some("connection refused".into()),
                progress: Some(0.5),
            }
        );
    }

    #[test]
    fn test_unavailable_without_fallback_mentions_only_primary() {
        let status = pair(ClientStatus::failed("connection refused"), None);
        assert_eq!(
            decide(&status),
            ReadinessDecision::Unavailable(UnavailableReason {
                primary_error: "connection refused".into(),
                fallback_error: None,
            })
        );
    }

    #[test]
    fn test_unavailable_with_fallback_mentions_both() {
        let status = pair(
            ClientStatus::failed("primary down"),
            Some(ClientStatus::failed("fallback down")),
        );
        let ReadinessDecision::Unavailable(reason) = decide(&status) else {
            panic!("expected unavailable");
        };
        assert_eq!(reason.primary_error, "primary down");
        assert_eq!(reason.fallback_error.as_deref(), Some("fallback down"));
    }

    #[test]
    fn test_working_client_with_error_is_not_waited_on() {
        let mut primary = ClientStatus::syncing(Some(0.2));
        primary.error = Some("chain id mismatch".into());
        let status = pair(primary, None);
        assert!(matches!(decide(&status), ReadinessDecision::Unavailable(_)));
    }

    #[test]
    fn test_disabled_fallback_ignored_even_if_synced() {
        let status = PairStatus {
            primary_client_status: ClientStatus::failed("down"),
            fallback_client_status: ClientStatus::synced(),
            fallback_enabled: false,
        };
        assert!(matches!(decide(&status), ReadinessDecision::Unavailable(_)));
    }
}
