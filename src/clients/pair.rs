//! Primary/fallback client pair.
//!
//! # Responsibilities
//! - Own the primary and optional fallback instance of one client kind
//! - Probe both and publish the latest `PairStatus` snapshot
//! - Answer "is primary ready", "is fallback ready", "which one to use"

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::clients::types::{ClientKind, ClientStatus, PairStatus};
use crate::clients::ClientProbe;
use crate::observability::metrics;
use crate::readiness::decision::{decide, ClientTarget, ReadinessDecision};

/// A primary client and its optional fallback.
pub struct ClientPair<C: ?Sized> {
    kind: ClientKind,
    primary: Arc<C>,
    fallback: Option<Arc<C>>,
    /// Snapshot from the most recent `check_status`.
    last_status: ArcSwap<PairStatus>,
}

impl<C: ?Sized + ClientProbe> ClientPair<C> {
    pub fn new(kind: ClientKind, primary: Arc<C>, fallback: Option<Arc<C>>) -> Self {
        let initial = PairStatus {
            fallback_enabled: fallback.is_some(),
            ..PairStatus::default()
        };
        Self {
            kind,
            primary,
            fallback,
            last_status: ArcSwap::from_pointee(initial),
        }
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback.is_some()
    }

    /// Probe both clients concurrently and publish the result.
    pub async fn check_status(&self) -> PairStatus {
        let fallback = async {
            match &self.fallback {
                Some(client) => client.check_status().await,
                None => ClientStatus::default(),
            }
        };
        let (primary_client_status, fallback_client_status) =
            tokio::join!(self.primary.check_status(), fallback);

        metrics::record_client_status(self.kind, ClientTarget::Primary, &primary_client_status);
        if self.fallback_enabled() {
            metrics::record_client_status(self.kind, ClientTarget::Fallback, &fallback_client_status);
        }

        let status = PairStatus {
            primary_client_status,
            fallback_client_status,
            fallback_enabled: self.fallback_enabled(),
        };
        self.last_status.store(Arc::new(status.clone()));
        status
    }

    /// Probe the pair and run the decision table on the fresh snapshot.
    pub async fn evaluate(&self) -> ReadinessDecision {
        let status = self.check_status().await;
        decide(&status)
    }

    /// Snapshot from the most recent probe, without touching the clients.
    pub fn last_status(&self) -> Arc<PairStatus> {
        self.last_status.load_full()
    }

    pub fn is_primary_ready(&self) -> bool {
        self.last_status.load().is_primary_ready()
    }

    pub fn is_fallback_ready(&self) -> bool {
        self.last_status.load().is_fallback_ready()
    }

    pub fn primary(&self) -> &Arc<C> {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&Arc<C>> {
        self.fallback.as_ref()
    }

    /// Handle for the given target; `None` if it is the fallback and none is configured.
    pub fn handle(&self, target: ClientTarget) -> Option<Arc<C>> {
        match target {
            ClientTarget::Primary => Some(self.primary.clone()),
            ClientTarget::Fallback => self.fallback.clone(),
        }
    }

    /// The currently-ready instance according to the last snapshot.
    pub fn active(&self) -> Option<Arc<C>> {
        if self.is_primary_ready() {
            Some(self.primary.clone())
        } else if self.is_fallback_ready() {
            self.fallback.clone()
        } else {
            None
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for ClientPair<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPair")
            .field("kind", &self.kind)
            .field("fallback_enabled", &self.fallback.is_some())
            .finish()
    }
}
