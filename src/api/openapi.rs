//! OpenAPI documentation and schema generation
//!
//! The document is generated at compile time by utoipa from the handler
//! annotations in [`routes`](crate::api::routes).

use utoipa::OpenApi;

/// OpenAPI documentation for the kindle-digest REST API
///
/// Served at `/openapi.json`, and under `/swagger-ui` when Swagger UI is enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "kindle-digest REST API",
        version = "0.1.0",
        description = "Turns a batch of articles into an e-book digest and emails it to a Kindle address",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Digest
        crate::api::routes::convert,
        crate::api::routes::download,

        // System
        crate::api::routes::root,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::ArticleInput,
        crate::types::ConvertRequest,
        crate::types::ConvertResponse,
        crate::error::ApiError,
    )),
    tags(
        (name = "digest", description = "Digest conversion, delivery and download"),
        (name = "system", description = "System endpoints - Root message, health checks, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
