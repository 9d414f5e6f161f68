//! Conversation handling: session resolution, prompt assembly, LLM call
//! and persistence of the exchange.

use chatbot_db::sessions;
use chatbot_db::{ChatMessage, ChatSession, DbPool, MessageBy};
use chatbot_llm::{ChatModel, Message};
use chatbot_rag::VectorStore;
use chatbot_telemetry::Metrics;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prompts::{grounded_prompt, PromptDomain};
use crate::{ChatError, ChatResult};

/// A validated chat request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    /// Continue this session; a new one is started when absent.
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
        }
    }
}

/// How the answer is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Domain prompt and conversation history only.
    Plain,
    /// Also inject the `top_k` most relevant indexed chunks.
    Grounded { top_k: usize },
}

impl ReplyMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReplyMode::Plain => "plain",
            ReplyMode::Grounded { .. } => "grounded",
        }
    }
}

/// The assistant's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    /// Whether this request started the session.
    pub created: bool,
    pub answer: String,
}

/// Conversation service shared by the HTTP handlers.
pub struct ChatService {
    db: DbPool,
    model: Arc<dyn ChatModel>,
    store: Option<VectorStore>,
    domain: PromptDomain,
    metrics: Metrics,
}

impl ChatService {
    /// Create a new chat service.
    ///
    /// # Arguments
    /// * `db` - Database pool
    /// * `model` - Chat-completion model
    /// * `domain` - Prompt domain used for every conversation
    /// * `metrics` - Metrics collector
    pub fn new(db: DbPool, model: Arc<dyn ChatModel>, domain: PromptDomain, metrics: Metrics) -> Self {
        Self {
            db,
            model,
            store: None,
            domain,
            metrics,
        }
    }

    /// Enable grounded replies backed by `store`.
    pub fn with_retrieval(mut self, store: VectorStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn domain(&self) -> PromptDomain {
        self.domain
    }

    /// Answer `request`, continuing or starting a session.
    ///
    /// Nothing is written unless the model produced an answer; the session,
    /// the user message and the assistant message are then stored in one
    /// transaction.
    pub async fn reply(&self, request: ChatRequest, mode: ReplyMode) -> ChatResult<ChatReply> {
        let result = self.answer(request, mode).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        self.metrics.inc_chat_requests(mode.label(), outcome);
        result
    }

    async fn answer(&self, request: ChatRequest, mode: ReplyMode) -> ChatResult<ChatReply> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidRequest("message may not be blank".to_string()));
        }

        let existing = match request.session_id.as_deref() {
            Some(id) => match sessions::find_session(self.db.pool(), id).await? {
                Some(session) if session.is_deleted => {
                    return Err(ChatError::SessionNotFound(id.to_string()))
                }
                found => found,
            },
            None => None,
        };

        let history = match &existing {
            Some(session) => sessions::session_messages(self.db.pool(), session.id).await?,
            None => Vec::new(),
        };

        let system_prompt = self.system_prompt(message, mode).await?;
        let messages = build_messages(system_prompt, &history, message);
        debug!("Sending {} messages to {}", messages.len(), self.model.name());

        let started = Instant::now();
        let answer = match self.model.complete(&messages).await {
            Ok(answer) => answer,
            Err(e) => {
                self.metrics.inc_llm_errors();
                return Err(e.into());
            }
        };
        self.metrics
            .observe_llm_latency(self.model.name(), started.elapsed().as_secs_f64());

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let (session, created) = match existing {
            Some(session) => (session, false),
            None => {
                let session_id = request
                    .session_id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                sessions::get_or_create_session(&mut tx, &session_id, message, now).await?
            }
        };

        sessions::insert_message(&mut *tx, session.id, MessageBy::User, message, now).await?;
        sessions::insert_message(&mut *tx, session.id, MessageBy::Assistant, &answer, now).await?;
        sessions::touch_session(&mut *tx, session.id, now).await?;
        tx.commit().await.map_err(anyhow::Error::from)?;

        if created {
            self.metrics.inc_sessions_created();
            info!("Started chat session {}", session.session_id);
        }

        Ok(ChatReply {
            session_id: session.session_id,
            created,
            answer,
        })
    }

    async fn system_prompt(&self, message: &str, mode: ReplyMode) -> ChatResult<String> {
        let base = self.domain.system_prompt();
        let ReplyMode::Grounded { top_k } = mode else {
            return Ok(base);
        };

        let store = self.store.as_ref().ok_or(ChatError::RetrievalUnavailable)?;
        let context = store.relevant_chunks(message, top_k).await?;
        if context.trim().is_empty() {
            warn!("No indexed context found; answering without documents");
            return Ok(base);
        }
        Ok(grounded_prompt(&base, &context))
    }

    /// Live sessions, newest first.
    pub async fn list_sessions(&self) -> ChatResult<Vec<ChatSession>> {
        Ok(sessions::list_sessions(self.db.pool()).await?)
    }

    /// A live session with its messages, oldest first.
    pub async fn session_history(&self, session_id: &str) -> ChatResult<(ChatSession, Vec<ChatMessage>)> {
        let session = sessions::find_session(self.db.pool(), session_id)
            .await?
            .filter(|s| !s.is_deleted)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;
        let messages = sessions::session_messages(self.db.pool(), session.id).await?;
        Ok((session, messages))
    }

    /// Soft-delete a session.
    pub async fn delete_session(&self, session_id: &str) -> ChatResult<()> {
        if sessions::soft_delete_session(self.db.pool(), session_id, Utc::now()).await? {
            info!("Deleted chat session {}", session_id);
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id.to_string()))
        }
    }
}

/// System prompt, then the stored history, then the new user message.
pub fn build_messages(system_prompt: String, history: &[ChatMessage], message: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(history.iter().map(|entry| match entry.message_by {
        MessageBy::User => Message::user(entry.message.clone()),
        MessageBy::Assistant => Message::assistant(entry.message.clone()),
    }));
    messages.push(Message::user(message));
    messages
}
