//! Database connection pool management.

use crate::error::{StoreError, StoreResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const IN_MEMORY: &str = ":memory:";

/// Database connection pool wrapper.
///
/// The pool holds a single connection: the ingestion run is the only writer
/// and every statement is issued sequentially.
#[derive(Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Open (creating if missing) the SQLite database at `db_path`.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file, or `:memory:`
    pub async fn new(db_path: &str) -> StoreResult<Self> {
        let base = if db_path == IN_MEMORY {
            SqliteConnectOptions::from_str(IN_MEMORY).map_err(StoreError::Open)?
        } else {
            SqliteConnectOptions::new().filename(db_path)
        };
        let options = base
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(StoreError::Open)?;

        info!("Connected to database at {}", db_path);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the transaction table and its index if they do not exist yet.
    ///
    /// Safe to call on an already initialized store.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        info!("Ensuring database schema");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database schema ready");
        Ok(())
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Check that `path` can hold the store: it must not be a directory and must
/// be openable for append. The file is created if it does not exist.
pub fn check_store_path(path: &Path) -> StoreResult<()> {
    if path.is_dir() {
        return Err(StoreError::PathIsDirectory {
            path: path.to_path_buf(),
        });
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StoreError::PathNotWritable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}
