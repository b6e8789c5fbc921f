//! Execution client probe against a mock JSON-RPC endpoint over real HTTP.

use serde_json::json;
use std::time::Duration;

use node_readiness::clients::{
    BlockSyncProgress, ClientProbe, ExecutionClient, RpcExecutionClient,
};

mod common;

use common::{start_execution_rpc, unix_time_ago};

async fn connect(syncing: serde_json::Value, block_age: Duration) -> (RpcExecutionClient, u64) {
    let timestamp = unix_time_ago(block_age);
    let addr = start_execution_rpc(syncing, timestamp).await;
    let client = RpcExecutionClient::connect(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    (client, timestamp)
}

#[tokio::test]
async fn test_not_syncing_with_fresh_head_is_synced() {
    let (client, timestamp) = connect(json!(false), Duration::from_secs(12)).await;

    assert_eq!(client.sync_progress().await.unwrap(), None);
    assert_eq!(client.latest_block_timestamp().await.unwrap(), timestamp);

    let status = client.check_status().await;
    assert!(status.is_working);
    assert!(status.is_synced);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_not_syncing_with_stale_head_is_syncing() {
    let (client, _) = connect(json!(false), Duration::from_secs(3600)).await;

    let status = client.check_status().await;
    assert!(status.is_working);
    assert!(!status.is_synced);
    assert_eq!(status.sync_progress, None);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_block_range_reports_progress() {
    let syncing = json!({
        "startingBlock": "0x64",
        "currentBlock": "0x8e",
        "highestBlock": "0xc8"
    });
    let (client, _) = connect(syncing, Duration::from_secs(12)).await;

    assert_eq!(
        client.sync_progress().await.unwrap(),
        Some(BlockSyncProgress {
            starting_block: 100,
            current_block: 142,
            highest_block: 200,
        })
    );

    let status = client.check_status().await;
    assert!(status.is_working);
    assert!(!status.is_synced);
    let progress = status.sync_progress.unwrap();
    assert!((progress - 0.42).abs() < 1e-9);
}
