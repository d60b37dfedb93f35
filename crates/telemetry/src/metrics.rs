//! Prometheus metrics for ingestion runs.

use prometheus::{
    histogram_opts, opts, Encoder, HistogramVec, IntCounter, Registry, TextEncoder,
};

/// Metrics collector for one crawler run.
///
/// Each instance owns its registry so several pipelines (tests, repeated
/// runs) can coexist in one process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    blocks_committed: IntCounter,
    transactions_inserted: IntCounter,
    duplicates_skipped: IntCounter,
    anomalies: IntCounter,
    rpc_errors: IntCounter,
    rpc_latency: HistogramVec,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let blocks_committed = IntCounter::with_opts(opts!(
            "block_crawler_blocks_committed_total",
            "Total number of blocks committed to the store"
        ))?;
        let transactions_inserted = IntCounter::with_opts(opts!(
            "block_crawler_transactions_inserted_total",
            "Total number of transactions newly inserted"
        ))?;
        let duplicates_skipped = IntCounter::with_opts(opts!(
            "block_crawler_duplicates_skipped_total",
            "Total number of transactions skipped because their hash was already stored"
        ))?;
        let anomalies = IntCounter::with_opts(opts!(
            "block_crawler_anomalies_total",
            "Total number of transactions rejected for inconsistent block data"
        ))?;
        let rpc_errors = IntCounter::with_opts(opts!(
            "block_crawler_rpc_errors_total",
            "Total number of RPC errors"
        ))?;
        let rpc_latency = HistogramVec::new(
            histogram_opts!(
                "block_crawler_rpc_latency_seconds",
                "RPC call latency in seconds"
            ),
            &["operation"],
        )?;

        registry.register(Box::new(blocks_committed.clone()))?;
        registry.register(Box::new(transactions_inserted.clone()))?;
        registry.register(Box::new(duplicates_skipped.clone()))?;
        registry.register(Box::new(anomalies.clone()))?;
        registry.register(Box::new(rpc_errors.clone()))?;
        registry.register(Box::new(rpc_latency.clone()))?;

        Ok(Self {
            registry,
            blocks_committed,
            transactions_inserted,
            duplicates_skipped,
            anomalies,
            rpc_errors,
            rpc_latency,
        })
    }

    pub fn inc_blocks_committed(&self) {
        self.blocks_committed.inc();
    }

    pub fn inc_transactions_inserted(&self, count: u64) {
        self.transactions_inserted.inc_by(count);
    }

    pub fn inc_duplicates_skipped(&self, count: u64) {
        self.duplicates_skipped.inc_by(count);
    }

    pub fn inc_anomalies(&self) {
        self.anomalies.inc();
    }

    pub fn inc_rpc_errors(&self) {
        self.rpc_errors.inc();
    }

    /// Record RPC latency.
    pub fn observe_rpc_latency(&self, operation: &str, duration_secs: f64) {
        self.rpc_latency.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn blocks_committed(&self) -> u64 {
        self.blocks_committed.get()
    }

    pub fn transactions_inserted(&self) -> u64 {
        self.transactions_inserted.get()
    }

    /// Get metrics in the Prometheus text exposition format.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_do_not_collide() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.inc_blocks_committed();
        first.inc_transactions_inserted(3);

        assert_eq!(first.blocks_committed(), 1);
        assert_eq!(first.transactions_inserted(), 3);
        assert_eq!(second.blocks_committed(), 0);
    }

    #[test]
    fn test_gather_exposes_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.inc_duplicates_skipped(2);
        metrics.observe_rpc_latency("get_block", 0.25);

        let text = metrics.gather().unwrap();
        assert!(text.contains("block_crawler_duplicates_skipped_total 2"));
        assert!(text.contains("block_crawler_rpc_latency_seconds_count{operation=\"get_block\"} 1"));
    }
}
