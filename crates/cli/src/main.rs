//! CLI application for block crawler.

use block_crawler_db::{check_store_path, DbPool, TransactionStore};
use block_crawler_ingestion::{validate_endpoint, BlockRange, IngestionPipeline, Outcome, RpcClient};
use block_crawler_telemetry::{init_logging, Metrics};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_UNREACHABLE: u8 = 2;
const EXIT_ABORTED: u8 = 3;

#[derive(Parser)]
#[command(name = "block-crawler")]
#[command(about = "Ingest historical Ethereum transactions for a block range into SQLite")]
struct Cli {
    /// Ethereum JSON-RPC endpoint URL
    rpc_endpoint: String,

    /// SQLite database path
    database_path: PathBuf,

    /// Inclusive block range, e.g. 100-200
    #[arg(allow_hyphen_values = true)]
    block_range: String,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Timeout for each RPC request, in seconds
    #[arg(long, default_value = "30")]
    rpc_timeout_secs: u64,

    /// Sample output path for per-block audit lines
    #[arg(long)]
    sample_output_path: Option<PathBuf>,

    /// Write a Prometheus metrics snapshot here when the run ends
    #[arg(long)]
    metrics_output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(ExitCode::from(usage_exit_code(&e)));
        }
    };
    init_logging(cli.log_level.as_deref())?;

    let endpoint = match validate_endpoint(&cli.rpc_endpoint) {
        Ok(url) => url,
        Err(e) => {
            error!("Input endpoint URL {} is not valid: {}", cli.rpc_endpoint, e);
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };

    if let Err(e) = check_store_path(&cli.database_path) {
        error!("Input database path is not accessible: {}", e);
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    }

    let range = match BlockRange::parse(&cli.block_range) {
        Ok(range) => range,
        Err(e) => {
            error!("Invalid block range: {}", e);
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };

    let Some(database_path) = cli.database_path.to_str() else {
        error!("Input database path is not valid UTF-8: {:?}", cli.database_path);
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    };
    let db = match open_store(database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database at {}: {}", database_path, e);
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };

    let metrics = Metrics::new()?;
    let rpc_client = match RpcClient::new(
        endpoint,
        Duration::from_secs(cli.rpc_timeout_secs),
        metrics.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            db.close().await;
            return Err(e.into());
        }
    };

    let pipeline = IngestionPipeline::new(rpc_client, TransactionStore::new(db), metrics.clone())
        .with_sample_output(cli.sample_output_path);
    let result = pipeline.run(range).await;
    pipeline.close().await;

    if let Some(path) = cli.metrics_output.as_deref() {
        write_metrics(path, &metrics);
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("Ingestion not started: {}", e);
            return Ok(ExitCode::from(EXIT_UNREACHABLE));
        }
    };

    match &report.outcome {
        Outcome::Completed => {
            info!(
                "Ingested blocks {}: {} blocks, {} new transactions, {} duplicates, {} rejected",
                report.range,
                report.blocks_committed,
                report.transactions_inserted,
                report.duplicates_skipped,
                report.anomalies
            );
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Aborted { block_number, reason } => {
            let last = report
                .last_committed_block
                .map_or_else(|| "none".to_string(), |n| n.to_string());
            let resume = report
                .resume_range()
                .map_or_else(String::new, |r| r.to_string());
            error!(
                "Ingestion aborted at block {} ({}); last committed block: {}; resume with range {}",
                block_number, reason, last, resume
            );
            Ok(ExitCode::from(EXIT_ABORTED))
        }
    }
}

/// Help and version requests succeed; any other argument error is an input error.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_INVALID_INPUT
    } else {
        0
    }
}

async fn open_store(database_path: &str) -> anyhow::Result<DbPool> {
    let db = DbPool::new(database_path).await?;
    if let Err(e) = db.ensure_schema().await {
        db.close().await;
        return Err(e.into());
    }
    Ok(db)
}

fn write_metrics(path: &Path, metrics: &Metrics) {
    match metrics.gather() {
        Ok(body) => {
            if let Err(e) = std::fs::write(path, body) {
                warn!("Failed to write metrics to {:?}: {}", path, e);
            }
        }
        Err(e) => warn!("Failed to gather metrics: {}", e),
    }
}
