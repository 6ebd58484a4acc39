pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

/// Upper bound on files per upload request; the whole body may hold this many max-size files.
const MAX_FILES_PER_REQUEST: usize = 16;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes()
        .saturating_mul(MAX_FILES_PER_REQUEST);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/set-job-description",
            post(handlers::handle_set_job_description),
        )
        .route(
            "/api/job-description",
            get(handlers::handle_get_job_description),
        )
        .route(
            "/api/process-resumes",
            post(handlers::handle_process_resumes),
        )
        .route(
            "/api/results",
            get(handlers::handle_get_results).delete(handlers::handle_clear_results),
        )
        .route("/api/analytics", get(handlers::handle_analytics))
        .route("/api/sessions", get(handlers::handle_list_sessions))
        .route("/api/sessions/:id", get(handlers::handle_get_session))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
