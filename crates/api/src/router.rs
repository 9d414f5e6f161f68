//! Router setup.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::SharedState;

/// Build the HTTP router. Paths keep their trailing slash.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/chatbot/", post(handlers::chat))
        .route("/chatbot/custom/", post(handlers::custom_chat))
        .route(
            "/chatbot/rag/upload/",
            post(handlers::upload_document)
                .layer(DefaultBodyLimit::max(handlers::MAX_UPLOAD_BYTES)),
        )
        .route("/chatbot/rag/documents/", get(handlers::list_documents))
        .route("/chatbot/sessions/", get(handlers::list_sessions))
        .route(
            "/chatbot/sessions/:session_id/",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
