//! SQLite-backed vector store for document chunks.

use chatbot_db::documents::{self, NewChunk};
use chatbot_db::DbPool;
use chrono::Utc;
use std::hash::Hasher;
use std::sync::Arc;
use tracing::{debug, info};
use twox_hash::XxHash64;
use uuid::Uuid;

use crate::chunker::{split_text, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::embedder::{cosine_similarity, decode_embedding, encode_embedding, Embedder};
use crate::RagResult;

pub const DEFAULT_TOP_K: usize = 5;

/// A stored chunk with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub source: String,
    pub chunk_index: i64,
    pub content: String,
    pub score: f32,
}

/// Chunks, embeds and searches document text.
#[derive(Clone)]
pub struct VectorStore {
    db: DbPool,
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    overlap: usize,
}

impl VectorStore {
    pub fn new(db: DbPool, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            db,
            embedder,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }

    /// Override the chunking window.
    pub fn with_chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.overlap = overlap;
        self
    }

    /// Split, embed and index `text` under `source_name`.
    ///
    /// All chunks are written in one transaction.
    ///
    /// # Returns
    /// The number of chunks indexed.
    pub async fn add_document_text(
        &self,
        text: &str,
        source_name: &str,
        document_id: Option<&str>,
    ) -> RagResult<usize> {
        let chunks: Vec<String> = split_text(text, self.chunk_size, self.overlap)
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if chunks.is_empty() {
            return Ok(0);
        }

        let source_hash = source_hash(source_name);
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        for (index, chunk) in chunks.iter().enumerate() {
            let suffix = Uuid::new_v4().simple().to_string();
            let id = format!("{}_{}_{}", source_hash, index, &suffix[..8]);
            let embedding = encode_embedding(&self.embedder.embed(chunk));

            documents::insert_chunk(
                &mut *tx,
                &NewChunk {
                    id: &id,
                    document_id,
                    source: source_name,
                    chunk_index: index as i64,
                    content: chunk,
                    embedding: &embedding,
                },
                now,
            )
            .await?;
        }

        tx.commit().await.map_err(anyhow::Error::from)?;
        info!("Indexed {} chunks from {}", chunks.len(), source_name);
        Ok(chunks.len())
    }

    /// The `top_k` chunks most similar to `query`, best first.
    pub async fn search(&self, query: &str, top_k: usize) -> RagResult<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query);
        let stored = documents::all_chunks(self.db.pool()).await?;

        let mut scored: Vec<ScoredChunk> = stored
            .into_iter()
            .map(|chunk| {
                let score = cosine_similarity(&query_embedding, &decode_embedding(&chunk.embedding));
                ScoredChunk {
                    source: chunk.source,
                    chunk_index: chunk.chunk_index,
                    content: chunk.content,
                    score,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        debug!("Retrieved {} chunks for query", scored.len());
        Ok(scored)
    }

    /// Contents of the most relevant chunks joined by newlines; empty when
    /// nothing is indexed.
    pub async fn relevant_chunks(&self, query: &str, top_k: usize) -> RagResult<String> {
        let chunks = self.search(query, top_k).await?;
        Ok(chunks
            .into_iter()
            .map(|c| c.content)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn source_hash(source_name: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(source_name.as_bytes());
    hex::encode(hasher.finish().to_be_bytes())
}
