//! API error type and its JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatbot_chat::ChatError;
use chatbot_rag::RagError;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::error;

/// Generic message returned when the chat flow fails.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong, please try again later.";

/// Field name to list of validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("{0}")]
    NotFound(String),
    #[error("chat failed: {0}")]
    Chat(ChatError),
    #[error("upload failed: {0}")]
    Upload(#[from] RagError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Validation failure on a single field.
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), vec![message.to_string()]);
        ApiError::Validation(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Chat(_) | ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::SessionNotFound(id) => ApiError::NotFound(format!("Session {} not found.", id)),
            ChatError::InvalidRequest(_) => ApiError::field("message", "This field may not be blank."),
            other => ApiError::Chat(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::Malformed(detail) => json!({ "detail": detail }),
            ApiError::NotFound(message) => json!({ "message": message }),
            ApiError::Chat(err) => {
                error!("{}, {}", err, SOMETHING_WENT_WRONG);
                json!({ "message": SOMETHING_WENT_WRONG })
            }
            ApiError::Upload(err) => {
                error!("{}, {}", err, SOMETHING_WENT_WRONG);
                json!({ "message": SOMETHING_WENT_WRONG })
            }
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                json!({ "message": SOMETHING_WENT_WRONG })
            }
        };

        (status, Json(body)).into_response()
    }
}
