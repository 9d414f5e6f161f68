//! Request validation and response bodies.

use chatbot_chat::{ChatReply, ChatRequest};
use chatbot_db::{ChatMessage, ChatSession, IngestedDocument, MessageBy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, FieldErrors};

pub const SESSION_ID_MAX_LEN: usize = 36;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";

/// How an empty `session_id` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankSession {
    Reject,
    /// Treat as absent.
    Allow,
}

/// Coerce a JSON value into trimmed text. Numbers are accepted and
/// rendered as strings; `null`, booleans, arrays and objects are not.
fn char_field(value: &Value) -> Result<String, &'static str> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(NULL),
        _ => Err(NOT_A_STRING),
    }
}

/// Validate a chat payload. `message` is required, trimmed and non-blank;
/// `session_id` is optional and at most 36 characters.
pub fn parse_chat_request(payload: &Value, blank_session: BlankSession) -> Result<ChatRequest, ApiError> {
    let object = payload.as_object().ok_or_else(|| {
        ApiError::Malformed("Invalid data. Expected a dictionary.".to_string())
    })?;
    let mut errors = FieldErrors::new();

    let message = match object.get("message").map(char_field) {
        None => {
            errors.insert("message".into(), vec![REQUIRED.into()]);
            None
        }
        Some(Ok(text)) if text.is_empty() => {
            errors.insert("message".into(), vec![BLANK.into()]);
            None
        }
        Some(Ok(text)) => Some(text),
        Some(Err(reason)) => {
            errors.insert("message".into(), vec![reason.into()]);
            None
        }
    };

    let session_id = match object.get("session_id").map(char_field) {
        None => None,
        Some(Ok(text)) if text.is_empty() => {
            if blank_session == BlankSession::Reject {
                errors.insert("session_id".into(), vec![BLANK.into()]);
            }
            None
        }
        Some(Ok(text)) if text.chars().count() > SESSION_ID_MAX_LEN => {
            errors.insert(
                "session_id".into(),
                vec![format!(
                    "Ensure this field has no more than {} characters.",
                    SESSION_ID_MAX_LEN
                )],
            );
            None
        }
        Some(Ok(text)) => Some(text),
        Some(Err(reason)) => {
            errors.insert("session_id".into(), vec![reason.into()]);
            None
        }
    };

    match message {
        Some(message) if errors.is_empty() => Ok(ChatRequest::new(message, session_id)),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// `{"data": ...}` envelope used by every successful response.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Present only when the request started a new session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub answer: String,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            session_id: reply.created.then_some(reply.session_id),
            answer: reply.answer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub label: String,
    pub last_interaction: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatSession> for SessionSummary {
    fn from(session: ChatSession) -> Self {
        Self {
            session_id: session.session_id,
            label: session.label,
            last_interaction: session.last_interaction,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message_by: MessageBy,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageView {
    fn from(message: ChatMessage) -> Self {
        Self {
            message_by: message.message_by,
            message: message.message,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: SessionSummary,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub original_name: String,
    pub source: String,
    pub num_chunks: i64,
    pub extractor: String,
    pub status: String,
    pub error_message: String,
}

impl From<IngestedDocument> for UploadResponse {
    fn from(doc: IngestedDocument) -> Self {
        Self {
            id: doc.id,
            original_name: doc.original_name,
            source: doc.source_name,
            num_chunks: doc.num_chunks,
            extractor: doc.extractor,
            status: doc.status.to_string(),
            error_message: doc.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(result: Result<ChatRequest, ApiError>) -> FieldErrors {
        match result {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_payload_is_trimmed() {
        let request = parse_chat_request(
            &json!({ "message": "  Who won in 2011?  ", "session_id": " abc " }),
            BlankSession::Reject,
        )
        .unwrap();
        assert_eq!(request.message, "Who won in 2011?");
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_and_blank_message() {
        let missing = errors(parse_chat_request(&json!({}), BlankSession::Reject));
        assert_eq!(missing["message"], vec![REQUIRED.to_string()]);

        let blank = errors(parse_chat_request(&json!({ "message": "   " }), BlankSession::Reject));
        assert_eq!(blank["message"], vec![BLANK.to_string()]);

        let wrong = errors(parse_chat_request(&json!({ "message": [1] }), BlankSession::Reject));
        assert_eq!(wrong["message"], vec![NOT_A_STRING.to_string()]);

        let boolean = errors(parse_chat_request(&json!({ "message": true }), BlankSession::Reject));
        assert_eq!(boolean["message"], vec![NOT_A_STRING.to_string()]);
    }

    #[test]
    fn test_null_fields_are_rejected() {
        let errs = errors(parse_chat_request(
            &json!({ "message": null, "session_id": null }),
            BlankSession::Allow,
        ));
        assert_eq!(errs["message"], vec![NULL.to_string()]);
        assert_eq!(errs["session_id"], vec![NULL.to_string()]);
    }

    #[test]
    fn test_numbers_are_coerced_to_text() {
        let request = parse_chat_request(
            &json!({ "message": 42, "session_id": 7 }),
            BlankSession::Reject,
        )
        .unwrap();
        assert_eq!(request.message, "42");
        assert_eq!(request.session_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_blank_session_handling_depends_on_route() {
        let payload = json!({ "message": "hi", "session_id": "" });

        let rejected = errors(parse_chat_request(&payload, BlankSession::Reject));
        assert_eq!(rejected["session_id"], vec![BLANK.to_string()]);

        let allowed = parse_chat_request(&payload, BlankSession::Allow).unwrap();
        assert!(allowed.session_id.is_none());
    }

    #[test]
    fn test_overlong_session_id() {
        let payload = json!({ "message": "hi", "session_id": "x".repeat(37) });
        let errs = errors(parse_chat_request(&payload, BlankSession::Allow));
        assert_eq!(
            errs["session_id"],
            vec!["Ensure this field has no more than 36 characters.".to_string()]
        );
    }

    #[test]
    fn test_errors_on_both_fields_are_reported_together() {
        let errs = errors(parse_chat_request(
            &json!({ "session_id": false }),
            BlankSession::Reject,
        ));
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        assert!(matches!(
            parse_chat_request(&json!(["hi"]), BlankSession::Reject),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_chat_response_hides_existing_session_id() {
        let created = ChatResponse::from(ChatReply {
            session_id: "s".to_string(),
            created: true,
            answer: "a".to_string(),
        });
        assert_eq!(serde_json::to_value(&created).unwrap(), json!({ "session_id": "s", "answer": "a" }));

        let continued = ChatResponse::from(ChatReply {
            session_id: "s".to_string(),
            created: false,
            answer: "a".to_string(),
        });
        assert_eq!(serde_json::to_value(&continued).unwrap(), json!({ "answer": "a" }));
    }
}
