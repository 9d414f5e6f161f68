//! HTTP request handlers.

mod chat;
mod documents;
mod health;
mod sessions;

pub use chat::{chat, custom_chat};
pub use documents::{list_documents, upload_document, MAX_UPLOAD_BYTES};
pub use health::{health_check, metrics};
pub use sessions::{delete_session, get_session, list_sessions};
