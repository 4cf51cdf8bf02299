//! Full pipeline against a mock Mailgun API
//!
//! Uses the real CLI converter (with `cp`, which shares ebook-convert's
//! `<input> <output>` calling convention) and the real Mailgun strategy
//! pointed at a wiremock server.

#![cfg(unix)]

mod common;

use common::TestServer;
use kindle_digest::config::{DeliveryConfig, MailgunConfig, OutputConfig};
use kindle_digest::{ArtifactNaming, CliConverter, Config, DigestPipeline, TransportConfig, delivery};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mailgun_config(output: &std::path::Path, api_base: String) -> Config {
    Config {
        output: OutputConfig {
            directory: output.to_path_buf(),
            naming: ArtifactNaming::Fixed {
                base_name: "daily_digest".into(),
            },
            device_format: Some("mobi".into()),
        },
        delivery: DeliveryConfig {
            recipient: "reader@kindle.com".into(),
            transport: TransportConfig::Mailgun(MailgunConfig {
                api_key: "key-123".into(),
                domain: "mg.example.com".into(),
                from: "digest@mg.example.com".into(),
                api_base,
            }),
            timeout: Duration::from_secs(5),
        },
        ..Default::default()
    }
}

async fn start(config: Config) -> Option<TestServer> {
    let Ok(cp) = which::which("cp") else {
        println!("Skipping test: cp not found in PATH");
        return None;
    };

    let config = Arc::new(config);
    let converter = Arc::new(CliConverter::new(cp));
    let strategy = delivery::from_config(&config.delivery).unwrap();
    let pipeline = Arc::new(DigestPipeline::new(config, converter, strategy));
    Some(TestServer::start(pipeline).await)
}

#[tokio::test]
async fn test_convert_sends_attachment_to_mailgun() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mg.example.com/messages"))
        .and(basic_auth("api", "key-123"))
        .and(body_string_contains("filename=\"daily_digest.mobi\""))
        .and(body_string_contains("<h1>A</h1>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"Queued"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let Some(server) = start(mailgun_config(temp_dir.path(), mock_server.uri())).await else {
        return;
    };

    let response = reqwest::Client::new()
        .post(server.url("/convert"))
        .json(&json!({"articles": [{"title": "A", "content": "B"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"message": "Converted & Sent!", "download_link": "/download/daily_digest.mobi"})
    );

    server.stop().await;
}

#[tokio::test]
async fn test_mailgun_rejection_is_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let Some(server) = start(mailgun_config(temp_dir.path(), mock_server.uri())).await else {
        return;
    };

    let response = reqwest::Client::new()
        .post(server.url("/convert"))
        .json(&json!({"articles": [{"title": "A", "content": "B"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"error": "Failed to send to Kindle", "details": "Failed to send email: Forbidden"})
    );

    // Artifacts were still produced before delivery failed
    assert!(temp_dir.path().join("daily_digest.mobi").exists());

    server.stop().await;
}
