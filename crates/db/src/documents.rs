//! Ingested document and chunk queries.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::{DocumentChunk, DocumentStatus, IngestedDocument};

/// Fields needed to register a newly uploaded document.
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub id: &'a str,
    pub file_path: &'a str,
    pub original_name: &'a str,
    pub source_name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: i64,
}

/// Fields needed to store one chunk of the retrieval index.
#[derive(Debug, Clone)]
pub struct NewChunk<'a> {
    pub id: &'a str,
    pub document_id: Option<&'a str>,
    pub source: &'a str,
    pub chunk_index: i64,
    pub content: &'a str,
    pub embedding: &'a [u8],
}

pub async fn insert_document<'e, E>(
    executor: E,
    document: &NewDocument<'_>,
    now: DateTime<Utc>,
) -> Result<IngestedDocument>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, IngestedDocument>(
        r#"
        INSERT INTO ingested_documents (
            id, file_path, original_name, source_name, mime_type, size_bytes,
            num_chunks, extractor, status, error_message, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, 0, '', 'processed', '', ?)
        RETURNING *
        "#,
    )
    .bind(document.id)
    .bind(document.file_path)
    .bind(document.original_name)
    .bind(document.source_name)
    .bind(document.mime_type)
    .bind(document.size_bytes)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Store the outcome of indexing a document.
pub async fn record_ingestion_result<'e, E>(
    executor: E,
    id: &str,
    num_chunks: i64,
    extractor: &str,
    status: DocumentStatus,
    error_message: &str,
) -> Result<IngestedDocument>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, IngestedDocument>(
        r#"
        UPDATE ingested_documents
        SET num_chunks = ?, extractor = ?, status = ?, error_message = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(num_chunks)
    .bind(extractor)
    .bind(status)
    .bind(error_message)
    .bind(id)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn find_document<'e, E>(executor: E, id: &str) -> Result<Option<IngestedDocument>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, IngestedDocument>("SELECT * FROM ingested_documents WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

/// All ingested documents, newest first.
pub async fn list_documents<'e, E>(executor: E) -> Result<Vec<IngestedDocument>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, IngestedDocument>(
        "SELECT * FROM ingested_documents ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn insert_chunk<'e, E>(executor: E, chunk: &NewChunk<'_>, now: DateTime<Utc>) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO document_chunks (
            id, document_id, source, chunk_index, content, embedding, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(chunk.id)
    .bind(chunk.document_id)
    .bind(chunk.source)
    .bind(chunk.chunk_index)
    .bind(chunk.content)
    .bind(chunk.embedding)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Every indexed chunk, in insertion order.
pub async fn all_chunks<'e, E>(executor: E) -> Result<Vec<DocumentChunk>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, DocumentChunk>(
        "SELECT * FROM document_chunks ORDER BY rowid ASC",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn count_chunks<'e, E>(executor: E) -> Result<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks")
        .fetch_one(executor)
        .await?;

    Ok(count)
}
