//! Document upload endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::dto::{Data, UploadResponse};
use crate::error::ApiError;
use crate::state::SharedState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// POST /chatbot/rag/upload/
///
/// Multipart form with a required `file` part and an optional `source` text part.
pub async fn upload_document(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Data<UploadResponse>>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut source: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Malformed(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Malformed(e.body_text()))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("source") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Malformed(e.body_text()))?;
                source = Some(text);
            }
            other => warn!("Ignoring unexpected upload field {:?}", other),
        }
    }

    let (name, bytes) = file.ok_or_else(|| ApiError::field("file", "No file was submitted."))?;
    if bytes.is_empty() {
        return Err(ApiError::field("file", "The submitted file is empty."));
    }

    let document = state
        .ingestor
        .store_upload(&bytes, &name, source.as_deref())
        .await?;
    info!(
        "Upload {} stored as {} ({} chunks)",
        name, document.id, document.num_chunks
    );

    Ok((StatusCode::CREATED, Json(Data::new(document.into()))))
}

/// GET /chatbot/rag/documents/
pub async fn list_documents(
    State(state): State<SharedState>,
) -> Result<Json<Data<Vec<UploadResponse>>>, ApiError> {
    let documents = state.ingestor.list_documents().await?;
    Ok(Json(Data::new(documents.into_iter().map(Into::into).collect())))
}
