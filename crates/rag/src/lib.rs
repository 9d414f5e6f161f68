//! Retrieval-augmented generation support for the chatbot service.
//!
//! Uploaded files are converted to text, split into overlapping chunks,
//! embedded and stored in SQLite. At question time the most similar chunks
//! are returned as context for the model.

pub mod chunker;
pub mod embedder;
pub mod extract;
pub mod ingest;
pub mod store;

pub use chunker::split_text;
pub use embedder::{Embedder, HashingEmbedder};
pub use extract::{extract_text, Extractor};
pub use ingest::DocumentIngestor;
pub use store::{ScoredChunk, VectorStore, DEFAULT_TOP_K};

/// Error type for ingestion and retrieval.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("{0} is not available in this build")]
    UnsupportedFormat(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Result type for ingestion and retrieval.
pub type RagResult<T> = Result<T, RagError>;
