//! Conversation logic for the chatbot service.

pub mod prompts;
pub mod service;

pub use prompts::{PromptDomain, UnknownDomain};
pub use service::{ChatReply, ChatRequest, ChatService, ReplyMode};

use chatbot_llm::LlmError;
use chatbot_rag::RagError;

/// Error type for chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("document retrieval is not configured")]
    RetrievalUnavailable,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RagError),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
