//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use block_crawler_db::{DbPool, TransactionStore};
use block_crawler_ingestion::{BlockSource, FetchError, RawBlock, RawTransaction};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// In-process block source serving a fixed set of blocks.
pub struct ScriptedSource {
    connected: bool,
    blocks: HashMap<u64, RawBlock>,
    failing: HashSet<u64>,
    closing: Option<(u64, TransactionStore)>,
    fetched: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new(blocks: Vec<RawBlock>) -> Self {
        Self {
            connected: true,
            blocks: blocks.into_iter().map(|b| (b.number, b)).collect(),
            failing: HashSet::new(),
            closing: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Make fetches of `number` fail with an RPC error.
    pub fn failing_at(mut self, number: u64) -> Self {
        self.failing.insert(number);
        self
    }

    /// Serve `block` when `number` is requested, whatever its own number.
    pub fn serving(mut self, number: u64, block: RawBlock) -> Self {
        self.blocks.insert(number, block);
        self
    }

    /// Close `store` while `number` is being fetched, so the write that
    /// follows fails.
    pub fn closing_store_at(mut self, number: u64, store: TransactionStore) -> Self {
        self.closing = Some((number, store));
        self
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockSource for ScriptedSource {
    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn get_block_with_transactions(&self, number: u64) -> Result<RawBlock, FetchError> {
        self.fetched.lock().unwrap().push(number);
        if self.failing.contains(&number) {
            return Err(FetchError::Rpc("upstream timeout".to_string()));
        }
        if let Some((at, store)) = &self.closing {
            if *at == number {
                store.close().await;
            }
        }
        self.blocks
            .get(&number)
            .cloned()
            .ok_or(FetchError::BlockNotFound(number))
    }
}

/// Transaction with a hash derived from `(block, index)`.
pub fn tx(block: u64, index: u8, value_wei: U256) -> RawTransaction {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&block.to_be_bytes());
    hash[31] = index;
    RawTransaction {
        hash: B256::from(hash),
        block_number: Some(block),
        value_wei,
    }
}

/// Block holding `count` transactions of one ether each.
pub fn block(number: u64, count: u8) -> RawBlock {
    RawBlock {
        number,
        timestamp: 1_438_269_988 + number,
        transactions: (0..count).map(|i| tx(number, i, U256::from(WEI_PER_ETHER))).collect(),
    }
}

pub fn hash_hex(block: u64, index: u8) -> String {
    format!("0x{}", hex::encode(tx(block, index, U256::ZERO).hash))
}

pub async fn memory_store() -> TransactionStore {
    let db = DbPool::new(":memory:").await.unwrap();
    db.ensure_schema().await.unwrap();
    TransactionStore::new(db)
}

pub async fn file_store(path: &std::path::Path) -> TransactionStore {
    let db = DbPool::new(path.to_str().unwrap()).await.unwrap();
    db.ensure_schema().await.unwrap();
    TransactionStore::new(db)
}
