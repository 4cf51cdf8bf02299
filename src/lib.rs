//! # kindle-digest
//!
//! HTTP service that turns a batch of articles into an e-book digest and
//! emails it to a Kindle address.
//!
//! ## Pipeline
//!
//! A `POST /convert` request runs one [`DigestPipeline`] pass:
//!
//! 1. Render the articles into a single HTML document
//! 2. Persist it under the output directory
//! 3. Convert HTML → EPUB with `ebook-convert`
//! 4. Optionally convert EPUB → MOBI (or another device format)
//! 5. Email the final file through Mailgun or SMTP
//!
//! Every generated file stays on disk and can be fetched again through
//! `GET /download/:filename`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kindle_digest::{CliConverter, Config, DigestPipeline, delivery};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::from_env()?);
//!
//!     let converter = Arc::new(CliConverter::from_config(&config.converter));
//!     let delivery = delivery::from_config(&config.delivery)?;
//!     let pipeline = Arc::new(DigestPipeline::new(config.clone(), converter, delivery));
//!
//!     kindle_digest::api::start_api_server(pipeline, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Artifact naming and lookup
pub mod artifacts;
/// Configuration types
pub mod config;
/// External format conversion
pub mod converter;
/// Email delivery strategies
pub mod delivery;
/// Error types
pub mod error;
/// Convert-and-deliver orchestration
pub mod pipeline;
/// HTML digest rendering
pub mod render;
/// Tracing subscriber setup
pub mod telemetry;
/// Core request and result types
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use artifacts::{ArtifactNaming, ArtifactSet, ArtifactStore};
pub use config::{Config, DeliveryConfig, TransportConfig};
pub use converter::{CliConverter, FormatConverter};
pub use delivery::{DeliveryStrategy, MailgunDelivery, SmtpDelivery};
pub use error::{ApiError, ConversionError, DeliveryError, Error, Result, ToHttpStatus};
pub use pipeline::{DigestPipeline, PipelineOutcome};
pub use types::{ArticleInput, ConvertRequest, ConvertResponse, DeliveryResult, DigestMessage};

/// Resolve once the process is asked to stop.
///
/// Used as the graceful-shutdown trigger of the API server.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

/// Resolve once the process is asked to stop (Ctrl+C).
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
