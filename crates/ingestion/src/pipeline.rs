//! Block range ingestion: fetch, extract, persist, commit.

use crate::block_source::BlockSource;
use crate::error::{BlockFault, FetchError, IngestionError};
use crate::extractor::extract;
use crate::range::BlockRange;
use block_crawler_db::{TransactionRecord, TransactionStore};
use block_crawler_telemetry::{BlockSample, Metrics, SampleLog};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Sequential ingestion of a block range into the transaction store.
///
/// Blocks are processed strictly in ascending order and each block is
/// committed before the next one is fetched. The first fetch or store
/// failure ends the run; everything committed before it stays in the store.
pub struct IngestionPipeline<C> {
    client: C,
    store: TransactionStore,
    metrics: Metrics,
    samples: SampleLog,
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Every block of the range was committed.
    Completed,
    /// The run stopped at `block_number`; that block and the rest of the
    /// range were not committed.
    Aborted { block_number: u64, reason: BlockFault },
}

/// Summary of one run.
#[derive(Debug)]
pub struct IngestionReport {
    pub range: BlockRange,
    pub blocks_committed: u64,
    pub last_committed_block: Option<u64>,
    pub transactions_inserted: u64,
    pub duplicates_skipped: u64,
    pub anomalies: u64,
    pub outcome: Outcome,
}

impl IngestionReport {
    fn new(range: BlockRange) -> Self {
        Self {
            range,
            blocks_committed: 0,
            last_committed_block: None,
            transactions_inserted: 0,
            duplicates_skipped: 0,
            anomalies: 0,
            outcome: Outcome::Completed,
        }
    }

    fn record_block(&mut self, progress: &BlockSample) {
        self.blocks_committed += 1;
        self.last_committed_block = Some(progress.block_number);
        self.transactions_inserted += progress.inserted;
        self.duplicates_skipped += progress.duplicates_skipped;
        self.anomalies += progress.anomalies;
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }

    /// Range to pass to a follow-up run after an abort.
    pub fn resume_range(&self) -> Option<BlockRange> {
        match self.outcome {
            Outcome::Completed => None,
            Outcome::Aborted { block_number, .. } => BlockRange::new(block_number, self.range.end()).ok(),
        }
    }
}

impl<C: BlockSource> IngestionPipeline<C> {
    /// Create a new pipeline.
    ///
    /// # Arguments
    /// * `client` - Block source, used exclusively by this pipeline
    /// * `store` - Initialized transaction store
    /// * `metrics` - Metrics collector
    pub fn new(client: C, store: TransactionStore, metrics: Metrics) -> Self {
        Self {
            client,
            store,
            metrics,
            samples: SampleLog::default(),
        }
    }

    /// Append a JSON audit line per committed block to `path`.
    pub fn with_sample_output(mut self, path: Option<PathBuf>) -> Self {
        self.samples = SampleLog::new(path);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Ingest every block in `range`.
    ///
    /// Fails only if the endpoint is unreachable before the first block, in
    /// which case nothing has been written. Mid-range faults are reported
    /// through [`Outcome::Aborted`].
    pub async fn run(&self, range: BlockRange) -> Result<IngestionReport, IngestionError> {
        if !self.client.is_connected().await {
            error!("Ethereum network cannot be reached");
            return Err(IngestionError::EndpointUnreachable);
        }

        info!("Ingesting blocks {} ({} blocks)", range, range.len());
        let mut report = IngestionReport::new(range);

        for block_number in range.blocks() {
            match self.ingest_block(block_number).await {
                Ok(sample) => {
                    info!(
                        "Block {}: {} transactions persisted to DB ({} already stored, {} rejected)",
                        block_number, sample.inserted, sample.duplicates_skipped, sample.anomalies
                    );
                    if let Err(e) = self.samples.record_block(&sample) {
                        warn!("Failed to write block sample: {}", e);
                    }
                    report.record_block(&sample);
                }
                Err(reason) => {
                    error!(
                        "Aborting at block {} after {} committed blocks: {}",
                        block_number, report.blocks_committed, reason
                    );
                    report.outcome = Outcome::Aborted { block_number, reason };
                    return Ok(report);
                }
            }
        }

        info!(
            "Completed blocks {}: {} transactions inserted, {} duplicates skipped",
            range, report.transactions_inserted, report.duplicates_skipped
        );
        Ok(report)
    }

    async fn ingest_block(&self, block_number: u64) -> Result<BlockSample, BlockFault> {
        let block = self.client.get_block_with_transactions(block_number).await?;
        if block.number != block_number {
            return Err(FetchError::UnexpectedBlock {
                requested: block_number,
                received: block.number,
            }
            .into());
        }

        let mut records: Vec<TransactionRecord> = Vec::with_capacity(block.transactions.len());
        let mut anomalies = 0;
        for item in extract(&block) {
            match item {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Rejecting transaction in block {}: {}", block_number, e);
                    self.metrics.inc_anomalies();
                    anomalies += 1;
                }
            }
        }

        let mut write = self.store.begin_block().await?;
        let inserted = write.insert_ignoring_duplicates(&records).await?;
        write.commit().await?;

        let duplicates_skipped = records.len() as u64 - inserted;
        self.metrics.inc_blocks_committed();
        self.metrics.inc_transactions_inserted(inserted);
        self.metrics.inc_duplicates_skipped(duplicates_skipped);

        Ok(BlockSample {
            block_number,
            block_timestamp: block.timestamp,
            transaction_count: block.transactions.len(),
            inserted,
            duplicates_skipped,
            anomalies,
        })
    }

    /// Release the store connection.
    pub async fn close(self) {
        self.store.close().await;
    }
}
