//! Prometheus metrics for the chatbot service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Metrics collector for the chatbot service.
///
/// Each instance owns its registry, so several services (or tests) in one
/// process never collide on metric names.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    chat_requests: IntCounterVec,
    sessions_created: IntCounter,
    llm_errors: IntCounter,
    llm_latency: HistogramVec,
    documents_ingested: IntCounterVec,
    chunks_indexed: IntCounter,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let chat_requests = IntCounterVec::new(
            Opts::new("chatbot_chat_requests_total", "Total number of chat requests"),
            &["mode", "outcome"],
        )?;
        registry.register(Box::new(chat_requests.clone()))?;

        let sessions_created = IntCounter::new(
            "chatbot_sessions_created_total",
            "Total number of chat sessions created",
        )?;
        registry.register(Box::new(sessions_created.clone()))?;

        let llm_errors = IntCounter::new(
            "chatbot_llm_errors_total",
            "Total number of failed LLM completions",
        )?;
        registry.register(Box::new(llm_errors.clone()))?;

        let llm_latency = HistogramVec::new(
            HistogramOpts::new(
                "chatbot_llm_latency_seconds",
                "LLM completion latency in seconds",
            ),
            &["model"],
        )?;
        registry.register(Box::new(llm_latency.clone()))?;

        let documents_ingested = IntCounterVec::new(
            Opts::new(
                "chatbot_documents_ingested_total",
                "Total number of uploaded documents",
            ),
            &["status"],
        )?;
        registry.register(Box::new(documents_ingested.clone()))?;

        let chunks_indexed = IntCounter::new(
            "chatbot_chunks_indexed_total",
            "Total number of document chunks added to the retrieval index",
        )?;
        registry.register(Box::new(chunks_indexed.clone()))?;

        Ok(Self {
            registry,
            chat_requests,
            sessions_created,
            llm_errors,
            llm_latency,
            documents_ingested,
            chunks_indexed,
        })
    }

    /// Count a chat request by mode ("plain" or "grounded") and outcome.
    pub fn inc_chat_requests(&self, mode: &str, outcome: &str) {
        self.chat_requests.with_label_values(&[mode, outcome]).inc();
    }

    /// Increment the sessions created counter.
    pub fn inc_sessions_created(&self) {
        self.sessions_created.inc();
    }

    /// Increment the LLM errors counter.
    pub fn inc_llm_errors(&self) {
        self.llm_errors.inc();
    }

    /// Record LLM latency.
    pub fn observe_llm_latency(&self, model: &str, duration_secs: f64) {
        self.llm_latency.with_label_values(&[model]).observe(duration_secs);
    }

    /// Count an uploaded document by its ingestion status.
    pub fn inc_documents_ingested(&self, status: &str) {
        self.documents_ingested.with_label_values(&[status]).inc();
    }

    /// Increment the indexed chunks counter.
    pub fn inc_chunks_indexed(&self, count: u64) {
        self.chunks_indexed.inc_by(count);
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
