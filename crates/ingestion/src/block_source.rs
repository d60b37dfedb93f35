//! Block source interface.
//!
//! The pipeline only needs a connectivity check and block retrieval with
//! transactions inlined; anything that provides both can feed it.

use crate::error::FetchError;
use alloy::primitives::{B256, U256};
use async_trait::async_trait;

/// A block as served by the endpoint, reduced to the fields ingestion uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub number: u64,
    /// Unix seconds.
    pub timestamp: u64,
    pub transactions: Vec<RawTransaction>,
}

/// A transaction inside a [`RawBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub hash: B256,
    /// Block number the transaction reports for itself. `None` for pending
    /// transactions.
    pub block_number: Option<u64>,
    pub value_wei: U256,
}

/// Trait for block sources.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Whether the endpoint answers requests.
    async fn is_connected(&self) -> bool;

    /// Get a block by number with full transaction objects.
    ///
    /// A block the endpoint does not know is [`FetchError::BlockNotFound`].
    async fn get_block_with_transactions(&self, number: u64) -> Result<RawBlock, FetchError>;
}
