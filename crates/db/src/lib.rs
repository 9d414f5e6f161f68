//! Database layer for the chatbot service.
//!
//! Provides SQLite storage for chat sessions, messages, ingested documents
//! and the retrieval index, with schema migrations.

pub mod documents;
pub mod models;
pub mod pool;
pub mod sessions;

pub use models::{ChatMessage, ChatSession, DocumentChunk, DocumentStatus, IngestedDocument, MessageBy};
pub use pool::DbPool;
