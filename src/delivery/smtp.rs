//! SMTP delivery (Gmail-style submission with STARTTLS)

use super::{DeliveryStrategy, attachment_mime, read_attachment};
use crate::config::SmtpConfig;
use crate::error::DeliveryError;
use crate::types::{DeliveryResult, DigestMessage};
use async_trait::async_trait;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::time::Duration;

/// Delivers digests through an authenticated SMTP session
///
/// The account address doubles as the sender. A fresh connection is opened
/// for every delivery and closed once the message is sent or has failed.
pub struct SmtpDelivery {
    config: SmtpConfig,
    recipient: String,
    timeout: Duration,
}

impl SmtpDelivery {
    /// Create an SMTP strategy sending to `recipient`
    pub fn new(config: SmtpConfig, recipient: String, timeout: Duration) -> Self {
        Self {
            config,
            recipient,
            timeout,
        }
    }

    /// Assemble the `multipart/mixed` message: plain-text body plus attachment
    fn build_message(&self, bytes: Vec<u8>, message: &DigestMessage) -> Result<Message, DeliveryError> {
        let from = parse_mailbox(&self.config.username)?;
        let to = parse_mailbox(&self.recipient)?;

        let content_type = ContentType::parse(&attachment_mime(&message.attachment_name))
            .map_err(|e| DeliveryError::Message(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(message.body.clone()))
                    .singlepart(
                        Attachment::new(message.attachment_name.clone()).body(bytes, content_type),
                    ),
            )
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }

    async fn send(&self, attachment: &Path, message: &DigestMessage) -> Result<(), DeliveryError> {
        let bytes = read_attachment(attachment).await?;
        let email = self.build_message(bytes, message)?;

        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());

        tracing::debug!(host = %self.config.host, port = self.config.port, "connecting to SMTP server");
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(credentials)
                .timeout(Some(self.timeout))
                .build();

        mailer.send(email).await?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl DeliveryStrategy for SmtpDelivery {
    async fn deliver(&self, attachment: &Path, message: &DigestMessage) -> DeliveryResult {
        tracing::info!(
            attachment = %attachment.display(),
            recipient = %self.recipient,
            "sending digest via SMTP"
        );

        match self.send(attachment, message).await {
            Ok(()) => {
                tracing::info!(subject = %message.subject, "email sent successfully");
                DeliveryResult::delivered()
            }
            Err(e @ DeliveryError::AttachmentMissing(_)) => {
                let error = e.to_string();
                tracing::error!(error = %error, "SMTP delivery failed");
                DeliveryResult::failed(error)
            }
            Err(e) => {
                let error = format!("Exception in SMTP delivery: {e}");
                tracing::error!(error = %error, "SMTP delivery failed");
                DeliveryResult::failed(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
