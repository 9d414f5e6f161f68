//! Observability and metrics for the chatbot service.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_file_path};
pub use metrics::Metrics;
