//! Database models and types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Transaction data stored in the database.
///
/// One row per unique transaction hash. Block number and timestamp are
/// denormalized onto the row so reads never need a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    /// `0x`-prefixed lowercase hex of the 32-byte transaction hash.
    pub hash: String,
    pub block_number: i64,
    /// Transferred value in ether, exact decimal text.
    pub value_ether: String,
    /// Unix seconds of the containing block.
    pub block_timestamp: i64,
}
