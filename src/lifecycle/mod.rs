//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Build client pairs → Supervisor → Task loop → Status API
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel token → Waits and sleeps unblock → Tasks exit → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One cancellation token for the whole process, passed explicitly
//! - Every long-running task is tracked; shutdown waits for all of them
//! - Shutdown has a deadline: exit anyway once it passes

pub mod shutdown;
pub mod signals;

pub use shutdown::{sleep_with_cancel, Shutdown};
