//! Document ingestion: store uploads, extract text, index chunks.

use chatbot_db::documents::{self, NewDocument};
use chatbot_db::{DbPool, DocumentStatus, IngestedDocument};
use chatbot_telemetry::Metrics;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extract::{extract_text, guess_mime_type, Extractor};
use crate::store::VectorStore;
use crate::RagResult;

const NO_TEXT_MESSAGE: &str = "No text could be extracted from the file";

/// Ingests files into the retrieval index and records each upload.
#[derive(Clone)]
pub struct DocumentIngestor {
    db: DbPool,
    store: VectorStore,
    media_root: PathBuf,
    metrics: Metrics,
}

impl DocumentIngestor {
    /// Create a new ingestor.
    ///
    /// # Arguments
    /// * `db` - Database pool
    /// * `store` - Vector store receiving the chunks
    /// * `media_root` - Directory under which uploads are written
    /// * `metrics` - Metrics collector
    pub fn new(db: DbPool, store: VectorStore, media_root: impl Into<PathBuf>, metrics: Metrics) -> Self {
        Self {
            db,
            store,
            media_root: media_root.into(),
            metrics,
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Every recorded upload, newest first.
    pub async fn list_documents(&self) -> RagResult<Vec<IngestedDocument>> {
        Ok(documents::list_documents(self.db.pool()).await?)
    }

    /// Extract text from `path` and index it under `source_name`.
    ///
    /// # Returns
    /// The number of chunks indexed and the extractor used. Files without
    /// extractable text index nothing.
    pub async fn ingest_file(
        &self,
        path: &Path,
        source_name: &str,
        document_id: Option<&str>,
    ) -> RagResult<(usize, Extractor)> {
        let owned = path.to_path_buf();
        let (text, extractor) = tokio::task::spawn_blocking(move || extract_text(&owned)).await?;

        if text.trim().is_empty() {
            warn!("No text extracted from {:?} ({})", path, extractor.name());
            return Ok((0, extractor));
        }

        let count = self.store.add_document_text(&text, source_name, document_id).await?;
        self.metrics.inc_chunks_indexed(count as u64);
        Ok((count, extractor))
    }

    /// Persist an uploaded file, index it and record the outcome.
    ///
    /// # Arguments
    /// * `bytes` - Uploaded file contents
    /// * `original_name` - File name supplied by the client
    /// * `source` - Optional source label; defaults to the file name
    pub async fn store_upload(
        &self,
        bytes: &[u8],
        original_name: &str,
        source: Option<&str>,
    ) -> RagResult<IngestedDocument> {
        let id = Uuid::new_v4().to_string();
        let file_name = sanitize_file_name(original_name);
        let source_name = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(file_name.as_str())
            .to_string();

        let now = Utc::now();
        let dir = self.media_root.join("uploads").join(now.format("%Y/%m/%d").to_string());
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}_{}", &id[..8], file_name));
        tokio::fs::write(&path, bytes).await?;

        let file_path = path.to_string_lossy().to_string();
        let inserted = documents::insert_document(
            self.db.pool(),
            &NewDocument {
                id: &id,
                file_path: &file_path,
                original_name,
                source_name: &source_name,
                mime_type: guess_mime_type(&path),
                size_bytes: bytes.len() as i64,
            },
            now,
        )
        .await;
        if let Err(e) = inserted {
            error!("Failed to record upload {}: {}", original_name, e);
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove orphaned upload {:?}: {}", path, remove_err);
            }
            return Err(e.into());
        }

        let (num_chunks, extractor, status, message) =
            match self.ingest_file(&path, &source_name, Some(&id)).await {
                Ok((0, extractor)) => (0, extractor, DocumentStatus::Error, NO_TEXT_MESSAGE.to_string()),
                Ok((count, extractor)) => (count, extractor, DocumentStatus::Processed, String::new()),
                Err(e) => {
                    error!("Failed to ingest {}: {}", original_name, e);
                    (0, Extractor::for_path(&path), DocumentStatus::Error, e.to_string())
                }
            };

        let document = documents::record_ingestion_result(
            self.db.pool(),
            &id,
            num_chunks as i64,
            extractor.name(),
            status,
            &message,
        )
        .await?;

        self.metrics.inc_documents_ingested(status.as_str());
        info!(
            "Ingested upload {} as {}: {} chunks, status {}",
            original_name, id, num_chunks, status
        );

        Ok(document)
    }
}

/// Keep only the final path component and replace characters that are
/// unsafe in file names.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashingEmbedder;
    use std::sync::Arc;

    async fn setup(media_root: &Path) -> DocumentIngestor {
        let db = DbPool::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let store = VectorStore::new(db.clone(), Arc::new(HashingEmbedder::default()));
        DocumentIngestor::new(db, store, media_root, Metrics::new().unwrap())
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report 2024.txt"), "report_2024.txt");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\menu.html"), "menu.html");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn test_upload_is_stored_and_indexed() {
        let media = tempfile::tempdir().unwrap();
        let ingestor = setup(media.path()).await;

        let doc = ingestor
            .store_upload(b"Check-in starts at 2pm.\nCheck-out is at 11am.", "policy.txt", None)
            .await
            .unwrap();

        assert_eq!(doc.status, DocumentStatus::Processed);
        assert_eq!(doc.num_chunks, 1);
        assert_eq!(doc.extractor, "extract_text_from_txt");
        assert_eq!(doc.source_name, "policy.txt");
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.size_bytes, 45);
        assert!(Path::new(&doc.file_path).starts_with(media.path().join("uploads")));
        assert!(Path::new(&doc.file_path).exists());

        let context = ingestor.store().relevant_chunks("when is check-out", 5).await.unwrap();
        assert!(context.contains("Check-out is at 11am."));

        let listed = ingestor.list_documents().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, doc.id);
    }

    #[tokio::test]
    async fn test_upload_uses_explicit_source() {
        let media = tempfile::tempdir().unwrap();
        let ingestor = setup(media.path()).await;

        let doc = ingestor
            .store_upload(b"menu,price\nsoup,4\n", "menu.csv", Some(" lunch-menu "))
            .await
            .unwrap();
        assert_eq!(doc.source_name, "lunch-menu");
        assert_eq!(doc.extractor, "extract_text_from_csv");
        assert_eq!(doc.status, DocumentStatus::Processed);
    }

    #[tokio::test]
    async fn test_upload_without_text_is_marked_error() {
        let media = tempfile::tempdir().unwrap();
        let ingestor = setup(media.path()).await;

        let doc = ingestor
            .store_upload(b"\x89PNG\r\n\x1a\n", "photo.png", None)
            .await
            .unwrap();
        assert_eq!(doc.status, DocumentStatus::Error);
        assert_eq!(doc.num_chunks, 0);
        assert_eq!(doc.extractor, "extract_text_from_image");
        assert_eq!(doc.error_message, NO_TEXT_MESSAGE);
    }

    fn count_files(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .map(|entry| entry.unwrap().path())
            .map(|path| if path.is_dir() { count_files(&path) } else { 1 })
            .sum()
    }

    #[tokio::test]
    async fn test_failed_record_removes_stored_file() {
        let media = tempfile::tempdir().unwrap();
        let ingestor = setup(media.path()).await;
        ingestor.db.close().await;

        let result = ingestor.store_upload(b"Gates open at 9am.", "notice.txt", None).await;
        assert!(result.is_err());
        assert_eq!(count_files(&media.path().join("uploads")), 0);
    }

    #[tokio::test]
    async fn test_ingest_local_file() {
        let media = tempfile::tempdir().unwrap();
        let ingestor = setup(media.path()).await;

        let path = media.path().join("guide.md");
        std::fs::write(&path, "# Fitness\nStretch before running.").unwrap();

        let (count, extractor) = ingestor.ingest_file(&path, "guide.md", None).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(extractor, Extractor::Text);
    }
}
