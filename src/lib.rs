//! Client readiness supervision for a staking node.
//!
//! Decides whether the primary or fallback execution client and Beacon Node
//! can serve requests, and gates background tasks and API requests on it.

pub mod admin;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod readiness;
pub mod tasks;

pub use config::schema::NodeConfig;
pub use lifecycle::Shutdown;
pub use readiness::ReadinessSupervisor;
