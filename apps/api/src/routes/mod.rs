pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::history::handlers as history;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/cover-letter", post(generation::handle_cover_letter))
        .route("/api/resume", post(generation::handle_resume_rewrite))
        // History API
        .route(
            "/api/history",
            get(history::handle_list_history).post(history::handle_create_history),
        )
        .route(
            "/api/history/:id",
            get(history::handle_get_history)
                .put(history::handle_update_history)
                .delete(history::handle_delete_history),
        )
        .with_state(state)
}
