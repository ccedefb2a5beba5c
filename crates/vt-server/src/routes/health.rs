//! Health check endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
