pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Resume uploads may be larger than Axum's 2 MB default.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interviews", post(interview::handle_start_interview))
        .route("/api/v1/interviews/:id", get(interview::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/abandon",
            post(interview::handle_abandon_interview),
        )
        // Matching API
        .route("/api/v1/match", post(matching::handle_match))
        .route(
            "/api/v1/match/upload",
            post(matching::handle_match_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
}
