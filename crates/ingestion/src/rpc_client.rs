//! Ethereum JSON-RPC client for block ingestion.

use crate::block_source::{BlockSource, RawBlock, RawTransaction};
use crate::error::FetchError;
use alloy::primitives::{B256, U256, U64};
use async_trait::async_trait;
use block_crawler_telemetry::Metrics;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Ethereum JSON-RPC client over HTTP(S).
pub struct RpcClient {
    client: Client,
    rpc_url: Url,
    metrics: Metrics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlock {
    number: U64,
    timestamp: U64,
    transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    hash: B256,
    block_number: Option<U64>,
    value: U256,
}

impl From<RpcBlock> for RawBlock {
    fn from(block: RpcBlock) -> Self {
        Self {
            number: block.number.to::<u64>(),
            timestamp: block.timestamp.to::<u64>(),
            transactions: block
                .transactions
                .into_iter()
                .map(|tx| RawTransaction {
                    hash: tx.hash,
                    block_number: tx.block_number.map(|n| n.to::<u64>()),
                    value_wei: tx.value,
                })
                .collect(),
        }
    }
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// # Arguments
    /// * `rpc_url` - Validated endpoint URL
    /// * `timeout` - Per-request timeout applied by the HTTP transport
    /// * `metrics` - Metrics collector
    pub fn new(rpc_url: Url, timeout: Duration, metrics: Metrics) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Initialized RPC client for {}", rpc_url);

        Ok(Self {
            client,
            rpc_url,
            metrics,
        })
    }

    async fn call_rpc(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        let start = Instant::now();
        let result = self.send(method, params).await;
        self.metrics
            .observe_rpc_latency(method, start.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.inc_rpc_errors();
        }
        result
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let mut result: Value = response.json().await?;

        if let Some(error) = result.get("error") {
            return Err(FetchError::Rpc(error.to_string()));
        }

        Ok(result.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl BlockSource for RpcClient {
    async fn is_connected(&self) -> bool {
        if !matches!(self.rpc_url.scheme(), "http" | "https") {
            warn!("Scheme {} is not served by the HTTP transport", self.rpc_url.scheme());
            return false;
        }

        match self.call_rpc("web3_clientVersion", json!([])).await {
            Ok(version) => {
                info!("Connected to {}", version.as_str().unwrap_or("unknown client"));
                true
            }
            Err(e) => {
                warn!("Endpoint {} not reachable: {}", self.rpc_url, e);
                false
            }
        }
    }

    async fn get_block_with_transactions(&self, number: u64) -> Result<RawBlock, FetchError> {
        let hex_block = format!("0x{:x}", number);
        let result = self
            .call_rpc("eth_getBlockByNumber", json!([hex_block, true]))
            .await?;

        let block = parse_block(result)?.ok_or(FetchError::BlockNotFound(number))?;
        debug!("Fetched block {} with {} transactions", number, block.transactions.len());
        Ok(block)
    }
}

/// Decode an `eth_getBlockByNumber` result; `null` means the block is unknown.
fn parse_block(result: Value) -> Result<Option<RawBlock>, FetchError> {
    let block: Option<RpcBlock> = serde_json::from_value(result)?;
    Ok(block.map(RawBlock::from))
}
