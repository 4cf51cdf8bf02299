//! REST API server module
//!
//! Exposes the digest pipeline over HTTP: `POST /convert` renders, converts
//! and delivers a digest, `GET /download/:filename` serves generated
//! artifacts.

use crate::error::{ApiError, Error};
use crate::pipeline::DigestPipeline;
use crate::{Config, Result};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Digest
/// - `POST /convert` - Render, convert and deliver a digest
/// - `GET /download/:filename` - Download a generated artifact
///
/// ## System
/// - `GET /` - Liveness message
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(pipeline: Arc<DigestPipeline>, config: Arc<Config>) -> Router {
    let state = AppState::new(pipeline, config.clone());

    let body_limit = match config.api.max_request_body {
        Some(bytes) => DefaultBodyLimit::max(bytes),
        None => DefaultBodyLimit::disable(),
    };

    let router = Router::new()
        // Digest
        .route("/convert", post(routes::convert).layer(body_limit))
        .route("/download/:filename", get(routes::download))
        // System
        .route("/", get(routes::root))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi mounts its own copy of the document under /api-docs
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
    } else {
        router
    }
}

/// Turn a handler panic into the JSON body used for unexpected faults
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        String::from("unknown panic payload")
    };

    tracing::error!(panic = %message, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::unexpected(
            "Internal server error",
            format!("panic: {message}"),
        )),
    )
        .into_response()
}

/// Start the API server on the configured bind address.
///
/// Runs until SIGTERM or SIGINT is received, then lets in-flight requests
/// finish before returning.
///
/// # Example
///
/// ```no_run
/// use kindle_digest::{Config, DigestPipeline, CliConverter, delivery};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::from_env()?);
/// let converter = Arc::new(CliConverter::from_config(&config.converter));
/// let delivery = delivery::from_config(&config.delivery)?;
/// let pipeline = Arc::new(DigestPipeline::new(config.clone(), converter, delivery));
///
/// kindle_digest::api::start_api_server(pipeline, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(pipeline: Arc<DigestPipeline>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;

    serve(listener, pipeline, config, crate::shutdown_signal()).await
}

/// Serve the API on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    pipeline: Arc<DigestPipeline>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr().map_err(Error::Io)?;
    let app = create_router(pipeline, config);

    tracing::info!(address = %address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
