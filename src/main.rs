//! Node readiness daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (TOML) ──▶ client pairs ──▶ ReadinessSupervisor
//!                       │                 │
//!                       │                 ├──▶ TaskLoop (waits, then runs tasks)
//!                       │                 └──▶ status API (/api/ready/{kind})
//!                       ▼
//!     execution client (JSON-RPC) + Beacon Node (REST), each primary/fallback
//!
//!   SIGINT / SIGTERM ──▶ Shutdown ──▶ cancels waits, stops API and task loop
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use node_readiness::admin::{self, AppState};
use node_readiness::clients::{
    BeaconClient, BeaconHttpClient, ClientKind, ClientPair, ClientResult, ExecutionClient,
    RpcExecutionClient,
};
use node_readiness::config::{load_config_or_default, ClientEndpointConfig, NodeConfig};
use node_readiness::lifecycle::{signals, Shutdown};
use node_readiness::observability::{logging, metrics};
use node_readiness::readiness::{BeaconPair, ExecutionPair, ReadinessSupervisor};
use node_readiness::tasks::{StatusLogTask, TaskLoop};

/// How long to wait for background tasks after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "node-readiness", version)]
#[command(about = "Supervises execution and consensus client readiness", long_about = None)]
struct Args {
    /// Path to the TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log sync progress on every poll of the task loop's readiness waits.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "node-readiness starting");

    tracing::info!(
        execution_primary = %config.execution.primary_url,
        execution_fallback = config.execution.fallback_url.as_deref().unwrap_or("none"),
        consensus_primary = %config.consensus.primary_url,
        consensus_fallback = config.consensus.fallback_url.as_deref().unwrap_or("none"),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let supervisor = Arc::new(build_supervisor(&config)?);
    let shutdown = Shutdown::new();

    TaskLoop::new(supervisor.clone())
        .with_verbose(args.verbose)
        .with_task(Arc::new(StatusLogTask::new(supervisor.clone())))
        .spawn(&shutdown);

    if config.api.enabled {
        let listener = TcpListener::bind(&config.api.bind_address).await?;
        let state = AppState {
            supervisor: supervisor.clone(),
            cancel: shutdown.token(),
            api_key: config.api.api_key.as_deref().map(Arc::from),
        };
        shutdown.spawn(async move {
            if let Err(e) = admin::serve(listener, state).await {
                tracing::error!(error = %e, "Client status API failed");
            }
        });
    }

    signals::shutdown_on_signal(shutdown.clone()).await;

    shutdown.wait_with_timeout(SHUTDOWN_GRACE).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_supervisor(config: &NodeConfig) -> ClientResult<ReadinessSupervisor> {
    let execution = build_execution_pair(&config.execution)?;
    let consensus = build_beacon_pair(&config.consensus)?;
    Ok(ReadinessSupervisor::new(Arc::new(execution), Arc::new(consensus)))
}

fn build_execution_pair(endpoints: &ClientEndpointConfig) -> ClientResult<ExecutionPair> {
    let timeout = Duration::from_secs(endpoints.timeout_secs);
    let primary: Arc<dyn ExecutionClient> =
        Arc::new(RpcExecutionClient::connect(&endpoints.primary_url, timeout)?);
    let fallback = match &endpoints.fallback_url {
        Some(url) => Some(Arc::new(RpcExecutionClient::connect(url, timeout)?) as Arc<dyn ExecutionClient>),
        None => None,
    };
    Ok(ClientPair::new(ClientKind::Execution, primary, fallback))
}

fn build_beacon_pair(endpoints: &ClientEndpointConfig) -> ClientResult<BeaconPair> {
    let timeout = Duration::from_secs(endpoints.timeout_secs);
    let primary: Arc<dyn BeaconClient> =
        Arc::new(BeaconHttpClient::new(&endpoints.primary_url, timeout)?);
    let fallback = match &endpoints.fallback_url {
        Some(url) => Some(Arc::new(BeaconHttpClient::new(url, timeout)?) as Arc<dyn BeaconClient>),
        None => None,
    };
    Ok(ClientPair::new(ClientKind::Consensus, primary, fallback))
}
