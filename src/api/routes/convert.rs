//! Digest handler: render, convert and deliver.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{ConvertRequest, ConvertResponse};
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};

/// POST /convert - Convert articles to an e-book and send it to the Kindle
///
/// The body is parsed leniently: a missing `articles` key means an empty
/// digest, and malformed entries are rendered with defaulted fields. Bodies
/// are unbounded unless `max_request_body` is configured; a body that cannot
/// be read still gets a JSON error.
#[utoipa::path(
    post,
    path = "/convert",
    tag = "digest",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Digest converted and delivered", body = ConvertResponse),
        (status = 400, description = "Request body is not valid JSON", body = crate::error::ApiError),
        (status = 413, description = "Request body exceeds the configured limit", body = crate::error::ApiError),
        (status = 500, description = "Conversion failed or unexpected error", body = crate::error::ApiError),
        (status = 502, description = "Delivery failed", body = crate::error::ApiError)
    )
)]
pub async fn convert(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ConvertResponse>, Error> {
    let body = body.map_err(|rejection| Error::RequestBody {
        status: rejection.status().as_u16(),
        message: rejection.body_text(),
    })?;

    // Parsed by hand so that a missing or wrong Content-Type is accepted
    let request: ConvertRequest = serde_json::from_slice(&body)?;

    let outcome = state.pipeline.run(&request.articles).await?;
    Ok(Json(outcome.to_response()))
}
