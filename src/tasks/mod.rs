//! Scheduled background work.
//!
//! # Data Flow
//! ```text
//! TaskLoop (runner.rs)
//!     → wait for execution pair, then consensus pair (unbounded)
//!     → run each ScheduledTask
//!     → sleep TASKS_INTERVAL (cancellable)
//!
//! On readiness error:
//!     → log, sleep TASK_COOLDOWN, retry
//! ```

pub mod runner;
pub mod status_report;

pub use runner::{ScheduledTask, TaskLoop, TASKS_INTERVAL, TASK_COOLDOWN};
pub use status_report::StatusLogTask;
