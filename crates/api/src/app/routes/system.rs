use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "ESL Management Backend is running" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Ready only while storage answers.
pub async fn ready(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", "storage is unavailable")
        }
    }
}
