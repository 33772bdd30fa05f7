pub mod debug;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extract::handlers::handle_extract;
use crate::screening::handlers as screening;
use crate::state::AppState;
use crate::uploads::handlers::handle_upload;

/// Multipart framing and the `user_id` field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/debug/env", get(debug::env_presence_handler))
        // Extraction
        .route("/api/extract", post(handle_extract))
        // Screening
        .route("/api/check-resume", post(screening::handle_check_resume))
        .route("/api/results", get(screening::handle_list_results))
        // Uploads
        .route(
            "/api/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
