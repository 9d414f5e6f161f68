//! Session history endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::dto::{Data, MessageView, SessionDetail, SessionSummary};
use crate::error::ApiError;
use crate::state::SharedState;

/// GET /chatbot/sessions/
pub async fn list_sessions(
    State(state): State<SharedState>,
) -> Result<Json<Data<Vec<SessionSummary>>>, ApiError> {
    let sessions = state.chat.list_sessions().await?;
    Ok(Json(Data::new(sessions.into_iter().map(Into::into).collect())))
}

/// GET /chatbot/sessions/:session_id/
pub async fn get_session(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<Data<SessionDetail>>, ApiError> {
    let (session, messages) = state.chat.session_history(&session_id).await?;

    Ok(Json(Data::new(SessionDetail {
        session: session.into(),
        messages: messages.into_iter().map(MessageView::from).collect(),
    })))
}

/// DELETE /chatbot/sessions/:session_id/
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.chat.delete_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
