//! Chat endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chatbot_chat::ReplyMode;
use serde_json::Value;
use tracing::info;

use crate::dto::{parse_chat_request, BlankSession, ChatResponse, Data};
use crate::error::ApiError;
use crate::state::SharedState;

/// POST /chatbot/
///
/// Answers with the configured domain prompt only.
pub async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<ChatResponse>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let request = parse_chat_request(&payload, BlankSession::Reject)?;

    let reply = state.chat.reply(request, ReplyMode::Plain).await?;
    info!("Chat reply in session {} (created: {})", reply.session_id, reply.created);

    Ok(Json(Data::new(reply.into())))
}

/// POST /chatbot/custom/
///
/// Answers with context retrieved from the uploaded documents.
pub async fn custom_chat(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<ChatResponse>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Malformed(e.body_text()))?;
    let request = parse_chat_request(&payload, BlankSession::Allow)?;

    let mode = ReplyMode::Grounded { top_k: state.top_k };
    let reply = state.chat.reply(request, mode).await?;
    info!(
        "Grounded reply in session {} (created: {})",
        reply.session_id, reply.created
    );

    Ok(Json(Data::new(reply.into())))
}
