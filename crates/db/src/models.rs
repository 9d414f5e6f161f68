//! Database models and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// A conversation, labelled with the first question asked in it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: i64,
    pub session_id: String,
    pub label: String,
    pub last_interaction: DateTime<Utc>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single user or assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    /// Row id of the owning [`ChatSession`].
    pub session_id: i64,
    pub message_by: MessageBy,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who sent a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageBy {
    User,
    Assistant,
}

impl MessageBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageBy::User => "USER",
            MessageBy::Assistant => "ASSISTANT",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MessageBy::User => "User",
            MessageBy::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for MessageBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded file and the result of indexing it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IngestedDocument {
    pub id: String,
    pub file_path: String,
    pub original_name: String,
    pub source_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub num_chunks: i64,
    pub extractor: String,
    pub status: DocumentStatus,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of ingesting a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processed,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processed => "processed",
            DocumentStatus::Error => "error",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(DocumentStatus::Processed),
            "error" => Ok(DocumentStatus::Error),
            other => Err(anyhow::anyhow!("unknown document status: {}", other)),
        }
    }
}

/// One indexed chunk of document text.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: Option<String>,
    pub source: String,
    pub chunk_index: i64,
    pub content: String,
    /// Little-endian `f32` values.
    pub embedding: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
