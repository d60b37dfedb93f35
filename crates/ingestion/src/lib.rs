//! Historical transaction ingestion for block crawler.
//!
//! Fetches blocks over JSON-RPC, normalizes their transactions and persists
//! them idempotently, one committed block at a time.

pub mod block_source;
pub mod endpoint;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod range;
pub mod rpc_client;

pub use block_source::{BlockSource, RawBlock, RawTransaction};
pub use endpoint::validate_endpoint;
pub use error::{BlockFault, EndpointError, ExtractError, FetchError, IngestionError, RangeError};
pub use extractor::extract;
pub use pipeline::{IngestionPipeline, IngestionReport, Outcome};
pub use range::BlockRange;
pub use rpc_client::RpcClient;
