//! The convert-and-deliver pipeline
//!
//! One run walks `Rendered → Persisted → Converted (EPUB) → Converted (device
//! format, optional) → Delivered` and stops at the first failing stage. The
//! artifacts of earlier stages stay on disk.

use crate::artifacts::{ArtifactSet, ArtifactStore};
use crate::config::Config;
use crate::converter::FormatConverter;
use crate::delivery::DeliveryStrategy;
use crate::error::{Error, Result};
use crate::render::render_digest;
use crate::types::{ArticleInput, ConvertResponse, DigestMessage};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message returned when a digest was converted and delivered
pub const SUCCESS_MESSAGE: &str = "Converted & Sent!";

/// Plain-text body of every digest email
pub const EMAIL_BODY: &str = "Here's your daily RSS feed for Kindle.";

/// Orchestrates rendering, conversion and delivery of one digest
///
/// Runs are serialized: artifact names are shared between requests (fixed
/// base name, or one name per calendar day), so the pipeline holds a lock from
/// persisting the HTML until delivery finishes.
pub struct DigestPipeline {
    config: Arc<Config>,
    store: ArtifactStore,
    converter: Arc<dyn FormatConverter>,
    delivery: Arc<dyn DeliveryStrategy>,
    run_lock: Mutex<()>,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Paths of every artifact written
    pub artifacts: ArtifactSet,
    /// Link a client can use to fetch the delivered file
    pub download_link: String,
}

impl PipelineOutcome {
    /// Response body for the API
    pub fn to_response(&self) -> ConvertResponse {
        ConvertResponse {
            message: SUCCESS_MESSAGE.to_string(),
            download_link: self.download_link.clone(),
        }
    }
}

impl DigestPipeline {
    /// Create a pipeline from configuration and its two collaborators
    pub fn new(
        config: Arc<Config>,
        converter: Arc<dyn FormatConverter>,
        delivery: Arc<dyn DeliveryStrategy>,
    ) -> Self {
        let store = ArtifactStore::new(config.output.directory.clone());
        Self {
            config,
            store,
            converter,
            delivery,
            run_lock: Mutex::new(()),
        }
    }

    /// The artifact directory, shared with the download endpoint
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Configuration this pipeline was built with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Run the pipeline for today's date (local time)
    pub async fn run(&self, articles: &[ArticleInput]) -> Result<PipelineOutcome> {
        self.run_for_date(articles, chrono::Local::now().date_naive())
            .await
    }

    /// Run the pipeline as if it were `date`
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the HTML cannot be written
    /// - [`Error::Conversion`] if either conversion stage fails
    /// - [`Error::Delivery`] if the transport reports a failure
    pub async fn run_for_date(
        &self,
        articles: &[ArticleInput],
        date: NaiveDate,
    ) -> Result<PipelineOutcome> {
        tracing::info!(articles = articles.len(), "processing digest request");

        let naming = &self.config.output.naming;
        let base_name = naming.base_name(date);
        let date_label = naming.date_label(date);

        let html = render_digest(articles, date_label.as_deref());
        let artifacts = self
            .store
            .artifact_set(&base_name, self.config.output.device_format.as_deref());

        let _guard = self.run_lock.lock().await;

        self.persist(&artifacts.html, &html).await?;
        self.convert(&artifacts.html, &artifacts.epub).await?;
        if let Some(device) = &artifacts.device {
            self.convert(&artifacts.epub, device).await?;
        }

        let message = DigestMessage {
            subject: format!("Daily Digest - {}", date.format("%Y-%m-%d")),
            body: EMAIL_BODY.to_string(),
            attachment_name: artifacts.final_file_name(),
        };

        tracing::info!(
            transport = self.delivery.name(),
            attachment = %artifacts.final_artifact().display(),
            "sending to Kindle"
        );
        let result = self
            .delivery
            .deliver(artifacts.final_artifact(), &message)
            .await;
        if !result.success {
            let details = result
                .error
                .unwrap_or_else(|| String::from("delivery failed without an error message"));
            tracing::error!(error = %details, "failed to send to Kindle");
            return Err(Error::Delivery(details));
        }

        let download_link = format!("/download/{}", artifacts.final_file_name());
        tracing::info!(download_link = %download_link, "converted and sent to Kindle");

        Ok(PipelineOutcome {
            artifacts,
            download_link,
        })
    }

    async fn persist(&self, path: &Path, html: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::info!(path = %path.display(), bytes = html.len(), "writing HTML");
        tokio::fs::write(path, html).await?;
        Ok(())
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let format = format_label(output);
        tracing::info!(
            converter = self.converter.name(),
            input = %input.display(),
            output = %output.display(),
            "converting to {format}"
        );

        match self.converter.convert(input, output).await {
            Ok(()) => {
                tracing::info!(path = %output.display(), "{format} created");
                Ok(())
            }
            Err(source) => {
                tracing::error!(error = %source, diagnostics = %source.diagnostics(), "conversion to {format} failed");
                Err(Error::Conversion { format, source })
            }
        }
    }
}

/// Upper-case extension used in messages ("EPUB", "MOBI")
fn format_label(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_else(|| String::from("UNKNOWN"))
}
