//! Shared application state.

use chatbot_chat::ChatService;
use chatbot_rag::{DocumentIngestor, DEFAULT_TOP_K};
use chatbot_telemetry::Metrics;
use std::sync::Arc;

/// State handed to every handler.
pub struct AppState {
    pub chat: ChatService,
    pub ingestor: DocumentIngestor,
    pub metrics: Metrics,
    /// Number of chunks injected into grounded replies.
    pub top_k: usize,
}

impl AppState {
    pub fn new(chat: ChatService, ingestor: DocumentIngestor, metrics: Metrics) -> Self {
        Self {
            chat,
            ingestor,
            metrics,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

pub type SharedState = Arc<AppState>;
