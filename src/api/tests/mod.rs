use super::*;
use crate::artifacts::ArtifactNaming;
use crate::converter::FormatConverter;
use crate::delivery::DeliveryStrategy;
use crate::test_helpers::{SpyDelivery, StubConverter, test_config};
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;


/// Router wired to the given collaborators, writing into a fresh temp dir
fn create_test_app(
    converter: Arc<dyn FormatConverter>,
    delivery: Arc<dyn DeliveryStrategy>,
    configure: impl FnOnce(&mut Config),
) -> (Router, TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    configure(&mut config);
    let config = Arc::new(config);

    let pipeline = Arc::new(DigestPipeline::new(config.clone(), converter, delivery));
    (create_router(pipeline, config), temp_dir)
}

/// Router with a succeeding converter and delivery and fixed artifact names
fn create_default_app() -> (Router, TempDir) {
    create_test_app(
        Arc::new(StubConverter::succeeding()),
        Arc::new(SpyDelivery::succeeding()),
        |config| {
            config.output.naming = ArtifactNaming::Fixed {
                base_name: "daily_digest".into(),
            }
        },
    )
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _temp_dir) = create_default_app();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (app, _temp_dir) = create_test_app(
        Arc::new(StubConverter::succeeding()),
        Arc::new(SpyDelivery::succeeding()),
        |config| config.api.cors_enabled = false,
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_swagger_ui_enabled() {
    let (app, _temp_dir) = create_test_app(
        Arc::new(StubConverter::succeeding()),
        Arc::new(SpyDelivery::succeeding()),
        |config| config.api.swagger_ui = true,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Swagger UI should be accessible when enabled"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert!(
        body_str.contains("<!DOCTYPE html>") || body_str.contains("<html"),
        "Response should contain HTML"
    );
}

#[tokio::test]
async fn test_swagger_ui_disabled_by_default() {
    let (app, _temp_dir) = create_default_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/swagger-ui/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_starts_responds_and_shuts_down() {
    let temp_dir = tempdir().unwrap();
    let config = Arc::new(test_config(temp_dir.path()));
    let pipeline = Arc::new(DigestPipeline::new(
        config.clone(),
        Arc::new(StubConverter::succeeding()),
        Arc::new(SpyDelivery::succeeding()),
    ));

    // Port 0 = OS assigns a free port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server_handle = tokio::spawn(serve(listener, pipeline, config, async move {
        shutdown_rx.await.ok();
    }));

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server_handle)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap()
        .unwrap();
}
