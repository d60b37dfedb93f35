//! Per-block sample lines for offline auditing of a run.

use chrono::DateTime;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What one committed block contributed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSample {
    pub block_number: u64,
    /// Block header timestamp, seconds since the Unix epoch.
    pub block_timestamp: u64,
    pub transaction_count: usize,
    pub inserted: u64,
    pub duplicates_skipped: u64,
    pub anomalies: u64,
}

#[derive(Serialize)]
struct SampleLine {
    block_number: u64,
    block_time: Option<String>,
    transaction_count: usize,
    inserted: u64,
    duplicates_skipped: u64,
    anomalies: u64,
}

impl BlockSample {
    /// RFC 3339 rendering of the block timestamp, if it is a representable instant.
    pub fn block_time(&self) -> Option<String> {
        i64::try_from(self.block_timestamp)
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|t| t.to_rfc3339())
    }
}

/// JSON-lines sink for [`BlockSample`]s. Disabled when built without a path.
#[derive(Debug, Clone, Default)]
pub struct SampleLog {
    path: Option<PathBuf>,
}

impl SampleLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one line for `sample`.
    pub fn record_block(&self, sample: &BlockSample) -> anyhow::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let line = SampleLine {
            block_number: sample.block_number,
            block_time: sample.block_time(),
            transaction_count: sample.transaction_count,
            inserted: sample.inserted,
            duplicates_skipped: sample.duplicates_skipped,
            anomalies: sample.anomalies,
        };
        let json = serde_json::to_string(&line)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        debug!("Wrote sample for block {} to {:?}", sample.block_number, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(block_number: u64, block_timestamp: u64) -> BlockSample {
        BlockSample {
            block_number,
            block_timestamp,
            transaction_count: 3,
            inserted: 2,
            duplicates_skipped: 1,
            anomalies: 0,
        }
    }

    #[test]
    fn test_block_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.jsonl");
        let log = SampleLog::new(Some(path.clone()));

        log.record_block(&sample(1, 1_438_269_988)).unwrap();
        log.record_block(&sample(2, 1_438_270_000)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["block_number"], 1);
        assert_eq!(lines[0]["block_time"], "2015-07-30T15:26:28+00:00");
        assert_eq!(lines[0]["inserted"], 2);
        assert_eq!(lines[0]["duplicates_skipped"], 1);
        assert_eq!(lines[1]["block_number"], 2);
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let log = SampleLog::default();
        assert!(log.path().is_none());
        log.record_block(&sample(1, 0)).unwrap();
    }

    #[test]
    fn test_unrepresentable_timestamp_has_no_block_time() {
        assert_eq!(sample(1, u64::MAX).block_time(), None);
        assert_eq!(sample(1, 0).block_time().as_deref(), Some("1970-01-01T00:00:00+00:00"));
    }
}
