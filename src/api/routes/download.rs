//! Artifact download handler.

use crate::api::AppState;
use crate::error::Error;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /download/:filename - Download a generated artifact
///
/// Streams the file from the output directory. Names containing path
/// separators or `..` are rejected before touching the filesystem.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "digest",
    params(
        ("filename" = String, Path, description = "Artifact file name, e.g. Digest_2024-03-09.mobi")
    ),
    responses(
        (status = 200, description = "Artifact bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid filename", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, Error> {
    let path = state.store().locate(&filename).await?;

    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    tracing::debug!(path = %path.display(), bytes = length, "serving artifact");

    let headers = [
        (header::CONTENT_TYPE, content_type.essence_str().to_string()),
        (header::CONTENT_LENGTH, length.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&filename)),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `attachment` disposition with `filename` as an escaped quoted-string
fn content_disposition(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            // Not representable in a header value
            c if c.is_control() => quoted.push('_'),
            c => quoted.push(c),
        }
    }
    format!("attachment; filename=\"{quoted}\"")
}
