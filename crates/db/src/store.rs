//! Idempotent transaction store.

use crate::error::{StoreError, StoreResult};
use crate::models::TransactionRecord;
use crate::pool::DbPool;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

/// Append-only sink for transaction records.
///
/// A record whose hash is already stored is dropped without error, so
/// re-ingesting an overlapping range never duplicates or rewrites rows.
#[derive(Clone)]
pub struct TransactionStore {
    db: DbPool,
}

/// Writes belonging to a single block.
///
/// Nothing is durable until [`BlockWrite::commit`]. Dropping the write
/// without committing rolls every insert back.
pub struct BlockWrite {
    tx: Transaction<'static, Sqlite>,
}

impl TransactionStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Start the write for one block.
    pub async fn begin_block(&self) -> StoreResult<BlockWrite> {
        let tx = self.db.pool().begin().await.map_err(StoreError::Write)?;
        Ok(BlockWrite { tx })
    }

    /// Number of stored transactions.
    pub async fn count(&self) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(self.db.pool())
            .await
            .map_err(StoreError::Read)
    }

    /// Look up a transaction by hash.
    pub async fn get(&self, hash: &str) -> StoreResult<Option<TransactionRecord>> {
        sqlx::query_as::<_, TransactionRecord>(
            "SELECT hash, block_number, value_ether, block_timestamp FROM transactions WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(self.db.pool())
        .await
        .map_err(StoreError::Read)
    }

    /// All transactions in blocks `first..=last`, ordered by block then hash.
    pub async fn records_in_blocks(&self, first: i64, last: i64) -> StoreResult<Vec<TransactionRecord>> {
        sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT hash, block_number, value_ether, block_timestamp
            FROM transactions
            WHERE block_number BETWEEN ? AND ?
            ORDER BY block_number, hash
            "#,
        )
        .bind(first)
        .bind(last)
        .fetch_all(self.db.pool())
        .await
        .map_err(StoreError::Read)
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

impl BlockWrite {
    /// Insert `records`, skipping any whose hash is already stored.
    ///
    /// # Returns
    /// The number of rows actually inserted.
    pub async fn insert_ignoring_duplicates(&mut self, records: &[TransactionRecord]) -> StoreResult<u64> {
        let mut inserted = 0;
        for record in records {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO transactions (
                    hash, block_number, value_ether, block_timestamp
                ) VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&record.hash)
            .bind(record.block_number)
            .bind(&record.value_ether)
            .bind(record.block_timestamp)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::Write)?;

            if result.rows_affected() == 0 {
                debug!("Transaction {} already stored, skipping", record.hash);
            }
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// Make this block's inserts durable.
    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::Write)
    }
}
