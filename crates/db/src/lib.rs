//! Database layer for block crawler.
//!
//! Provides the SQLite transaction store, its schema, and the idempotent
//! per-block write path used by ingestion.

pub mod error;
pub mod models;
pub mod pool;
pub mod store;

pub use error::StoreError;
pub use models::TransactionRecord;
pub use pool::{check_store_path, DbPool};
pub use store::{BlockWrite, TransactionStore};
