use axum::Json;
use serde_json::{Value, json};

pub const SERVICE_NAME: &str = "waitlist";

/// GET /
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}
