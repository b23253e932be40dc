use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn get_health_check() -> impl IntoResponse {
    Json(json!({ "message": "Rollcall student gateway is running." }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}
