//! HTTP surface of the chatbot service.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, SOMETHING_WENT_WRONG};
pub use router::create_router;
pub use state::{AppState, SharedState};
