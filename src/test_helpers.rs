//! Test doubles shared by unit tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::config::{Config, DeliveryConfig, OutputConfig, SmtpConfig, TransportConfig};
use crate::converter::FormatConverter;
use crate::delivery::DeliveryStrategy;
use crate::error::ConversionError;
use crate::types::{DeliveryResult, DigestMessage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Configuration writing into `dir` with dated names and a MOBI stage
pub(crate) fn test_config(dir: &Path) -> Config {
    Config {
        output: OutputConfig {
            directory: dir.to_path_buf(),
            ..Default::default()
        },
        delivery: DeliveryConfig {
            recipient: "reader@kindle.com".into(),
            transport: TransportConfig::Smtp(SmtpConfig {
                username: "me@gmail.com".into(),
                password: "app-password".into(),
                ..Default::default()
            }),
            timeout: Duration::from_secs(5),
        },
        ..Default::default()
    }
}

/// Converter that copies the input to the output, or fails on demand
pub(crate) struct StubConverter {
    failure: Option<(Option<String>, String)>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubConverter {
    pub(crate) fn succeeding() -> Self {
        Self::with_failure(None)
    }

    /// Fail every conversion with `diagnostics`
    pub(crate) fn failing(diagnostics: &str) -> Self {
        Self::with_failure(Some((None, diagnostics.to_string())))
    }

    /// Fail only conversions whose output has extension `ext`
    pub(crate) fn failing_on(ext: &str, diagnostics: &str) -> Self {
        Self::with_failure(Some((Some(ext.to_string()), diagnostics.to_string())))
    }

    fn with_failure(failure: Option<(Option<String>, String)>) -> Self {
        Self {
            failure,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of conversions observed running at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, output: &Path) -> Option<String> {
        let (ext, diagnostics) = self.failure.as_ref()?;
        match ext {
            None => Some(diagnostics.clone()),
            Some(ext) if output.extension().is_some_and(|e| e == ext.as_str()) => {
                Some(diagnostics.clone())
            }
            Some(_) => None,
        }
    }
}

#[async_trait]
impl FormatConverter for StubConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));

        // Give overlapping runs a chance to interleave
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = match self.should_fail(output) {
            Some(diagnostics) => Err(ConversionError::Failed {
                output: output.to_path_buf(),
                status: Some(1),
                diagnostics,
            }),
            None => tokio::fs::copy(input, output)
                .await
                .map(|_| ())
                .map_err(|e| ConversionError::Failed {
                    output: output.to_path_buf(),
                    status: None,
                    diagnostics: e.to_string(),
                }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Delivery strategy that records what it was asked to send
pub(crate) struct SpyDelivery {
    result: DeliveryResult,
    deliveries: Mutex<Vec<(PathBuf, DigestMessage)>>,
}

impl SpyDelivery {
    pub(crate) fn succeeding() -> Self {
        Self::returning(DeliveryResult::delivered())
    }

    pub(crate) fn failing(error: &str) -> Self {
        Self::returning(DeliveryResult::failed(error))
    }

    fn returning(result: DeliveryResult) -> Self {
        Self {
            result,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn deliveries(&self) -> Vec<(PathBuf, DigestMessage)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryStrategy for SpyDelivery {
    async fn deliver(&self, attachment: &Path, message: &DigestMessage) -> DeliveryResult {
        self.deliveries
            .lock()
            .unwrap()
            .push((attachment.to_path_buf(), message.clone()));
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        "spy"
    }
}
