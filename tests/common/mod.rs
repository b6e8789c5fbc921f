//! Shared utilities for integration tests: scripted clients and supervisor builders.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use node_readiness::clients::{
    BeaconClient, BeaconSyncStatus, BlockSyncProgress, ClientError, ClientKind, ClientPair,
    ClientProbe, ClientResult, ClientStatus, ExecutionClient,
};
use node_readiness::readiness::{BeaconPair, ExecutionPair, ReadinessSupervisor};

/// Simulated round trip of every mock call.
pub const CALL_LATENCY: Duration = Duration::from_millis(10);

/// Sequence of responses; the last one repeats forever.
pub struct Script<T> {
    steps: Mutex<VecDeque<T>>,
}

impl<T: Clone> Script<T> {
    pub fn new(steps: Vec<T>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        Self {
            steps: Mutex::new(steps.into()),
        }
    }

    pub fn next(&self) -> T {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap()
        }
    }
}

/// Call counters for one mock client.
#[derive(Default)]
pub struct CallStats {
    pub status_calls: AtomicUsize,
    pub sync_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl CallStats {
    async fn simulate_call(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(CALL_LATENCY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Block range whose progress is `fraction`.
pub fn block_range(fraction: f64) -> BlockSyncProgress {
    BlockSyncProgress {
        starting_block: 0,
        current_block: (fraction * 1000.0) as u64,
        highest_block: 1000,
    }
}

/// Scripted execution client.
pub struct MockExecution {
    endpoint: String,
    statuses: Script<ClientStatus>,
    progress: Script<Result<Option<BlockSyncProgress>, String>>,
    block_timestamp: AtomicU64,
    pub stats: CallStats,
}

impl MockExecution {
    pub fn new(
        endpoint: &str,
        statuses: Vec<ClientStatus>,
        progress: Vec<Result<Option<BlockSyncProgress>, String>>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            statuses: Script::new(statuses),
            progress: Script::new(progress),
            block_timestamp: AtomicU64::new(unix_now()),
            stats: CallStats::default(),
        }
    }

    pub fn synced(endpoint: &str) -> Arc<Self> {
        Arc::new(Self::new(endpoint, vec![ClientStatus::synced()], vec![Ok(None)]))
    }

    /// Reachable, reports `fraction` progress on every call.
    pub fn syncing(endpoint: &str, fraction: f64) -> Arc<Self> {
        Arc::new(Self::new(
            endpoint,
            vec![ClientStatus::syncing(Some(fraction))],
            vec![Ok(Some(block_range(fraction)))],
        ))
    }

    pub fn failing(endpoint: &str, error: &str) -> Arc<Self> {
        Arc::new(Self::new(
            endpoint,
            vec![ClientStatus::failed(error)],
            vec![Err(error.to_string())],
        ))
    }

    /// Pretend the latest block was produced `age` ago.
    pub fn with_block_age(self, age: Duration) -> Self {
        self.block_timestamp
            .store(unix_now().saturating_sub(age.as_secs()), Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ClientProbe for MockExecution {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn check_status(&self) -> ClientStatus {
        self.stats.status_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.simulate_call().await;
        self.statuses.next()
    }
}

#[async_trait]
impl ExecutionClient for MockExecution {
    async fn sync_progress(&self) -> ClientResult<Option<BlockSyncProgress>> {
        self.stats.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.simulate_call().await;
        self.progress.next().map_err(ClientError::Rpc)
    }

    async fn latest_block_timestamp(&self) -> ClientResult<u64> {
        self.stats.simulate_call().await;
        Ok(self.block_timestamp.load(Ordering::SeqCst))
    }
}

/// Scripted Beacon Node.
pub struct MockBeacon {
    endpoint: String,
    statuses: Script<ClientStatus>,
    sync: Script<Result<BeaconSyncStatus, String>>,
    pub stats: CallStats,
}

impl MockBeacon {
    pub fn new(
        endpoint: &str,
        statuses: Vec<ClientStatus>,
        sync: Vec<Result<BeaconSyncStatus, String>>,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            statuses: Script::new(statuses),
            sync: Script::new(sync),
            stats: CallStats::default(),
        }
    }

    pub fn synced(endpoint: &str) -> Arc<Self> {
        Arc::new(Self::new(
            endpoint,
            vec![ClientStatus::synced()],
            vec![Ok(beacon_synced())],
        ))
    }

    pub fn syncing(endpoint: &str, fraction: f64) -> Arc<Self> {
        Arc::new(Self::new(
            endpoint,
            vec![ClientStatus::syncing(Some(fraction))],
            vec![Ok(beacon_syncing(fraction))],
        ))
    }

    pub fn failing(endpoint: &str, error: &str) -> Arc<Self> {
        Arc::new(Self::new(
            endpoint,
            vec![ClientStatus::failed(error)],
            vec![Err(error.to_string())],
        ))
    }
}

pub fn beacon_synced() -> BeaconSyncStatus {
    BeaconSyncStatus {
        syncing: false,
        progress: 1.0,
    }
}

pub fn beacon_syncing(progress: f64) -> BeaconSyncStatus {
    BeaconSyncStatus {
        syncing: true,
        progress,
    }
}

#[async_trait]
impl ClientProbe for MockBeacon {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn check_status(&self) -> ClientStatus {
        self.stats.status_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.simulate_call().await;
        self.statuses.next()
    }
}

#[async_trait]
impl BeaconClient for MockBeacon {
    async fn sync_status(&self) -> ClientResult<BeaconSyncStatus> {
        self.stats.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.simulate_call().await;
        self.sync.next().map_err(ClientError::Rpc)
    }
}

pub fn execution_pair(
    primary: &Arc<MockExecution>,
    fallback: Option<&Arc<MockExecution>>,
) -> Arc<ExecutionPair> {
    let primary: Arc<dyn ExecutionClient> = primary.clone();
    let fallback = fallback.map(|f| f.clone() as Arc<dyn ExecutionClient>);
    Arc::new(ClientPair::new(ClientKind::Execution, primary, fallback))
}

pub fn beacon_pair(primary: &Arc<MockBeacon>, fallback: Option<&Arc<MockBeacon>>) -> Arc<BeaconPair> {
    let primary: Arc<dyn BeaconClient> = primary.clone();
    let fallback = fallback.map(|f| f.clone() as Arc<dyn BeaconClient>);
    Arc::new(ClientPair::new(ClientKind::Consensus, primary, fallback))
}

pub fn supervisor(execution: Arc<ExecutionPair>, consensus: Arc<BeaconPair>) -> Arc<ReadinessSupervisor> {
    Arc::new(ReadinessSupervisor::new(execution, consensus))
}

/// Supervisor whose execution pair is the given mocks and whose Beacon Node is synced.
pub fn execution_supervisor(
    primary: &Arc<MockExecution>,
    fallback: Option<&Arc<MockExecution>>,
) -> Arc<ReadinessSupervisor> {
    supervisor(
        execution_pair(primary, fallback),
        beacon_pair(&MockBeacon::synced("http://bn-primary"), None),
    )
}

/// Supervisor with both kinds synced on their primaries.
pub fn ready_supervisor() -> Arc<ReadinessSupervisor> {
    execution_supervisor(&MockExecution::synced("http://ec-primary"), None)
}

/// Start a mock Beacon API serving `body` with `status` on the syncing endpoint.
pub async fn start_beacon_api(status: u16, body: &'static str) -> SocketAddr {
    use axum::http::StatusCode;
    use axum::routing::get;

    let status = StatusCode::from_u16(status).unwrap();
    let app = axum::Router::new().route(
        "/eth/v1/node/syncing",
        get(move || async move {
            (status, [("content-type", "application/json")], body)
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Unix time `age` ago, for block timestamps.
pub fn unix_time_ago(age: Duration) -> u64 {
    unix_now().saturating_sub(age.as_secs())
}

struct RpcState {
    syncing: serde_json::Value,
    block_timestamp: u64,
}

fn hex_bytes(byte: &str, len: usize) -> String {
    format!("0x{}", byte.repeat(len))
}

fn latest_block(timestamp: u64) -> serde_json::Value {
    let zero_hash = hex_bytes("00", 32);
    serde_json::json!({
        "hash": hex_bytes("11", 32),
        "parentHash": zero_hash,
        "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "miner": hex_bytes("00", 20),
        "stateRoot": zero_hash,
        "transactionsRoot": zero_hash,
        "receiptsRoot": zero_hash,
        "logsBloom": hex_bytes("00", 256),
        "difficulty": "0x0",
        "number": "0x1b4",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": format!("{:#x}", timestamp),
        "extraData": "0x",
        "mixHash": zero_hash,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x7",
        "totalDifficulty": "0x0",
        "size": "0x220",
        "uncles": [],
        "transactions": []
    })
}

async fn rpc_handler(
    axum::extract::State(state): axum::extract::State<Arc<RpcState>>,
    axum::Json(request): axum::Json<serde_json::Value>,
) -> axum::Json<serde_json::Value> {
    let id = request["id"].clone();
    let result = match request["method"].as_str() {
        Some("eth_syncing") => state.syncing.clone(),
        Some("eth_getBlockByNumber") => latest_block(state.block_timestamp),
        _ => {
            return axum::Json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "method not found" }
            }))
        }
    };
    axum::Json(serde_json::json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

/// Start a mock execution client JSON-RPC endpoint.
///
/// `eth_syncing` answers with `syncing`; the latest block carries `block_timestamp`.
pub async fn start_execution_rpc(syncing: serde_json::Value, block_timestamp: u64) -> SocketAddr {
    let state = Arc::new(RpcState {
        syncing,
        block_timestamp,
    });
    let app = axum::Router::new()
        .route("/", axum::routing::post(rpc_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
