//! System handlers: root message, health, OpenAPI.

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Message returned by `GET /`
pub const ROOT_MESSAGE: &str = "RSS to Kindle API is running. Use /convert to process articles.";

/// GET / - Liveness message
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": ROOT_MESSAGE }))
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
