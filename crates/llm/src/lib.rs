//! LLM integration for the chatbot service.
//!
//! This crate provides a trait-based interface for chat-completion models
//! so the conversation logic can be driven by a real provider or by a test
//! double. [`GroqClient`] talks to Groq's OpenAI-compatible API.

pub mod groq;

pub use groq::{GroqClient, LlmConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of a message sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    MissingApiKey,
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("LLM provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM response could not be parsed: {0}")]
    InvalidResponse(String),
    #[error("LLM response contained no choices")]
    EmptyResponse,
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Trait for chat-completion models.
///
/// Implementations receive the full conversation (system prompt first) and
/// return the assistant's reply text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &str;

    /// Generate the next assistant message for `messages`.
    async fn complete(&self, messages: &[Message]) -> LlmResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");

        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
    }

    #[test]
    fn test_status_error_message() {
        let err = LlmError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "LLM provider returned 401: invalid api key");
    }
}
