//! Per-kind readiness state machine.
//!
//! # States
//! ```text
//! Idle → Checking → Ready
//!                 → Waiting → Checking (each poll / refresh)
//!                 → Failed  → Checking (next call)
//! ```
//!
//! `Failed` is reported to the caller but a later call re-enters `Checking`.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Observable phase of a kind supervisor.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessPhase {
    Idle = 0,
    Checking = 1,
    Ready = 2,
    Waiting = 3,
    Failed = 4,
}

impl From<u8> for ReadinessPhase {
    fn from(val: u8) -> Self {
        match val {
            1 => ReadinessPhase::Checking,
            2 => ReadinessPhase::Ready,
            3 => ReadinessPhase::Waiting,
            4 => ReadinessPhase::Failed,
            _ => ReadinessPhase::Idle,
        }
    }
}

impl ReadinessPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessPhase::Idle => "idle",
            ReadinessPhase::Checking => "checking",
            ReadinessPhase::Ready => "ready",
            ReadinessPhase::Waiting => "waiting",
            ReadinessPhase::Failed => "failed",
        }
    }
}

/// Lock-free cell holding the current phase, readable without taking the wait lock.
#[derive(Debug)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ReadinessPhase::Idle as u8))
    }

    pub fn get(&self) -> ReadinessPhase {
        ReadinessPhase::from(self.0.load(Ordering::Relaxed))
    }

    /// Store `phase`, returning the previous one.
    pub fn set(&self, phase: ReadinessPhase) -> ReadinessPhase {
        ReadinessPhase::from(self.0.swap(phase as u8, Ordering::Relaxed))
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}
