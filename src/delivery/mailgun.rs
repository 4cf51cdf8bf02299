//! Mailgun HTTP API delivery

use super::{DeliveryStrategy, attachment_mime, read_attachment};
use crate::config::MailgunConfig;
use crate::error::{DeliveryError, Error};
use crate::types::{DeliveryResult, DigestMessage};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;

/// Delivers digests through `POST {api_base}/{domain}/messages`
///
/// Authenticates with HTTP basic auth (`api` / API key). Only a `200 OK`
/// response counts as success.
pub struct MailgunDelivery {
    client: reqwest::Client,
    config: MailgunConfig,
    recipient: String,
}

impl MailgunDelivery {
    /// Create a Mailgun strategy sending to `recipient`
    ///
    /// `timeout` bounds each API request end to end.
    pub fn new(config: MailgunConfig, recipient: String, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            recipient,
        })
    }

    /// Messages endpoint for the configured domain
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.domain
        )
    }

    async fn send(&self, attachment: &Path, message: &DigestMessage) -> Result<(), DeliveryError> {
        let bytes = read_attachment(attachment).await?;

        let part = Part::bytes(bytes)
            .file_name(message.attachment_name.clone())
            .mime_str(&attachment_mime(&message.attachment_name))?;

        let form = Form::new()
            .text("from", self.config.from.clone())
            .text("to", self.recipient.clone())
            .text("subject", message.subject.clone())
            .text("text", message.body.clone())
            .part("attachment", part);

        tracing::debug!(endpoint = %self.endpoint(), "sending request to Mailgun API");
        let response = self
            .client
            .post(self.endpoint())
            .basic_auth("api", Some(&self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    status = %status,
                    error = %e,
                    "could not read Mailgun response body"
                );
                e.to_string()
            }
        };
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DeliveryStrategy for MailgunDelivery {
    async fn deliver(&self, attachment: &Path, message: &DigestMessage) -> DeliveryResult {
        tracing::info!(
            attachment = %attachment.display(),
            recipient = %self.recipient,
            "sending digest via Mailgun"
        );

        match self.send(attachment, message).await {
            Ok(()) => {
                tracing::info!("email sent successfully");
                DeliveryResult::delivered()
            }
            Err(e @ (DeliveryError::AttachmentMissing(_) | DeliveryError::Rejected { .. })) => {
                let error = e.to_string();
                tracing::error!(error = %error, "Mailgun delivery failed");
                DeliveryResult::failed(error)
            }
            Err(e) => {
                let error = format!("Exception in Mailgun delivery: {e}");
                tracing::error!(error = %error, "Mailgun delivery failed");
                DeliveryResult::failed(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "mailgun"
    }
}
