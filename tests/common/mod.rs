//! Common test utilities for kindle-digest integration tests

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use kindle_digest::{
    ConversionError, DeliveryResult, DeliveryStrategy, DigestMessage, DigestPipeline, api,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Converter that copies the input file to the output path
pub struct CopyConverter;

#[async_trait]
impl kindle_digest::FormatConverter for CopyConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|e| ConversionError::Failed {
                output: output.to_path_buf(),
                status: None,
                diagnostics: e.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Delivery strategy that records attachments instead of sending them
#[derive(Default)]
pub struct RecordingDelivery {
    pub sent: Mutex<Vec<(PathBuf, DigestMessage)>>,
}

#[async_trait]
impl DeliveryStrategy for RecordingDelivery {
    async fn deliver(&self, attachment: &Path, message: &DigestMessage) -> DeliveryResult {
        if !attachment.exists() {
            return DeliveryResult::failed(format!("File not found: {}", attachment.display()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((attachment.to_path_buf(), message.clone()));
        DeliveryResult::delivered()
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A server running on an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<kindle_digest::Result<()>>>,
}

impl TestServer {
    /// Serve `pipeline` on 127.0.0.1 with an OS-assigned port
    pub async fn start(pipeline: Arc<DigestPipeline>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = pipeline.config().clone();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(api::serve(listener, pipeline, config, async move {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for it to exit cleanly
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}
