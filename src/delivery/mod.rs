//! Digest delivery to the e-reader address
//!
//! The pipeline hands the final artifact to a [`DeliveryStrategy`] and only
//! looks at the returned [`DeliveryResult`]. Two strategies exist and exactly
//! one is instantiated per deployment, chosen by
//! [`TransportConfig`](crate::config::TransportConfig):
//!
//! - [`MailgunDelivery`]: multipart POST to the Mailgun messages API
//! - [`SmtpDelivery`]: authenticated SMTP submission with STARTTLS

use crate::config::{DeliveryConfig, TransportConfig};
use crate::error::DeliveryError;
use crate::types::{DeliveryResult, DigestMessage};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

mod mailgun;
mod smtp;

pub use mailgun::MailgunDelivery;
pub use smtp::SmtpDelivery;

/// Sends a file to the configured recipient as an email attachment
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    /// Deliver `attachment` with the given envelope contents
    ///
    /// Never panics and never returns an error value: every failure, including
    /// a missing attachment, is reported through [`DeliveryResult::failed`].
    async fn deliver(&self, attachment: &Path, message: &DigestMessage) -> DeliveryResult;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Instantiate the strategy selected by `config`
pub fn from_config(config: &DeliveryConfig) -> crate::Result<Arc<dyn DeliveryStrategy>> {
    let strategy: Arc<dyn DeliveryStrategy> = match &config.transport {
        TransportConfig::Mailgun(mailgun) => Arc::new(MailgunDelivery::new(
            mailgun.clone(),
            config.recipient.clone(),
            config.timeout,
        )?),
        TransportConfig::Smtp(smtp) => Arc::new(SmtpDelivery::new(
            smtp.clone(),
            config.recipient.clone(),
            config.timeout,
        )),
    };

    tracing::info!(
        transport = strategy.name(),
        recipient = %config.recipient,
        "delivery strategy configured"
    );
    Ok(strategy)
}

/// Read the attachment, failing without side effects if it is missing
pub(crate) async fn read_attachment(path: &Path) -> Result<Vec<u8>, DeliveryError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DeliveryError::AttachmentMissing(path.to_path_buf()))
        }
        Err(e) => Err(DeliveryError::Io(e)),
    }
}

/// MIME type for an attachment, guessed from its file name
pub(crate) fn attachment_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
