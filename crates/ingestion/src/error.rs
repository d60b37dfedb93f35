//! Error types for ingestion.

use block_crawler_db::StoreError;

/// Block range expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("expected <start>-<end>, got {0:?}")]
    Malformed(String),
    #[error("start block {start} is after end block {end}")]
    Reversed { start: u64, end: u64 },
    #[error("block number {0} is out of range")]
    OutOfBounds(u64),
}

/// Endpoint URL is not an accepted JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("not a URL: {0}")]
    Parse(String),
    #[error("unsupported scheme {0:?}")]
    Scheme(String),
    #[error("invalid host in {0:?}")]
    Host(String),
    #[error("credentials are not allowed in the endpoint URL")]
    Credentials,
    #[error("endpoint URL contains whitespace")]
    Whitespace,
}

/// Retrieving a block from the endpoint failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC request failed with status: {0}")]
    Status(reqwest::StatusCode),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("malformed block payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("block {0} not found")]
    BlockNotFound(u64),
    #[error("requested block {requested} but endpoint returned block {received}")]
    UnexpectedBlock { requested: u64, received: u64 },
}

/// A transaction that cannot be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("transaction {hash} claims block {found:?} but was served in block {expected}")]
    BlockNumberMismatch {
        hash: String,
        expected: u64,
        found: Option<u64>,
    },
    #[error("block {0} does not fit the store's integer range")]
    BlockOutOfBounds(u64),
    #[error("block timestamp {0} does not fit the store's integer range")]
    TimestampOutOfBounds(u64),
}

/// Reason a run stopped before the end of its range.
#[derive(Debug, thiserror::Error)]
pub enum BlockFault {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

/// Failure that prevents a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("endpoint unreachable")]
    EndpointUnreachable,
}
