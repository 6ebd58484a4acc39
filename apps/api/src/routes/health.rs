use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Resume Screening API",
        "status": "active"
    }))
}

/// GET /api/health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "resume_screening_api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
