//! Observability for block crawler runs: logging, metrics and audit samples.

pub mod audit;
pub mod logging;
pub mod metrics;

pub use audit::{BlockSample, SampleLog};
pub use logging::init_logging;
pub use metrics::Metrics;
