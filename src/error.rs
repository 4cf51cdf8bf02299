//! Error types for kindle-digest
//!
//! This module provides the error taxonomy for the convert-and-deliver pipeline:
//! - Domain-specific error types (conversion, delivery, download lookup, config)
//! - HTTP status code mapping for API integration
//! - The flat JSON error body returned to callers

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing_error::SpanTrace;
use utoipa::ToSchema;

/// Result type alias for kindle-digest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kindle-digest
///
/// Every pipeline stage returns one of these; the API layer turns them into
/// [`ApiError`] bodies.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable or field that caused the error (e.g., "KINDLE_EMAIL")
        key: Option<String>,
    },

    /// The external converter could not produce the requested format
    #[error("failed to convert to {format}: {source}")]
    Conversion {
        /// Upper-case name of the target format (e.g., "EPUB", "MOBI")
        format: String,
        /// What went wrong in the converter
        #[source]
        source: ConversionError,
    },

    /// The delivery transport reported a failure
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Requested artifact does not exist
    #[error("file not found: {0}")]
    NotFound(String),

    /// Requested artifact name is not a plain file name
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request body could not be read off the connection
    #[error("failed to read request body: {message}")]
    RequestBody {
        /// Status suggested by the body extractor
        status: u16,
        /// Extractor message
        message: String,
    },

    /// Malformed request body or serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures reported by a [`FormatConverter`](crate::converter::FormatConverter)
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter ran and exited unsuccessfully
    #[error("converter exited with status {status:?} while writing {output}")]
    Failed {
        /// Output path that was requested
        output: PathBuf,
        /// Exit code, if the process was not killed by a signal
        status: Option<i32>,
        /// Diagnostic text printed by the converter, verbatim
        diagnostics: String,
    },

    /// The converter binary could not be started
    #[error("failed to execute {program}: {reason}")]
    Spawn {
        /// The program that was invoked
        program: PathBuf,
        /// OS error text
        reason: String,
    },

    /// The converter did not finish in time and was killed
    #[error("converter timed out after {after:?}")]
    TimedOut {
        /// Configured timeout
        after: Duration,
    },
}

impl ConversionError {
    /// Diagnostic text to surface to the caller
    ///
    /// For [`ConversionError::Failed`] this is the converter's own output,
    /// unmodified.
    pub fn diagnostics(&self) -> String {
        match self {
            ConversionError::Failed { diagnostics, .. } => diagnostics.clone(),
            other => other.to_string(),
        }
    }
}

/// Transport-level failures inside a delivery strategy
///
/// Strategies flatten these into a [`DeliveryResult`](crate::types::DeliveryResult)
/// before handing control back to the pipeline.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Attachment is missing on disk
    #[error("File not found: {}", .0.display())]
    AttachmentMissing(PathBuf),

    /// Attachment could not be read
    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),

    /// A configured mail address did not parse
    #[error("invalid address {address}: {reason}")]
    Address {
        /// The offending address
        address: String,
        /// Parser message
        reason: String,
    },

    /// The email message could not be assembled
    #[error("failed to build message: {0}")]
    Message(String),

    /// SMTP connect, STARTTLS, login or send failed
    #[error("{0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// HTTP request to the mail API failed before a response arrived
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The mail API answered with something other than 200
    #[error("Failed to send email: {body}")]
    Rejected {
        /// Response status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

/// API error response format
///
/// This structure is returned by every endpoint when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "Failed to convert to EPUB",
///   "details": "Traceback ... ValueError: no input"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Short description of what failed
    pub error: String,

    /// Diagnostic text from the failing collaborator (converter output, mail API body)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Error chain and span trace for unexpected faults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ApiError {
    /// Create an error body with only a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            traceback: None,
        }
    }

    /// Create an error body with diagnostic details
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
            traceback: None,
        }
    }

    /// Create an error body for an unexpected fault
    pub fn unexpected(error: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            traceback: Some(traceback.into()),
        }
    }

    /// The "file not found" body used by the download endpoint
    pub fn file_not_found() -> Self {
        Self::new("File not found")
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::InvalidFilename(_) => 400,
            Error::Serialization(_) => 400,
            Error::RequestBody { status, .. } => *status,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Conversion { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - Mail provider errors
            Error::Delivery(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Conversion { source, .. } => match source {
                ConversionError::Failed { .. } => "conversion_failed",
                ConversionError::Spawn { .. } => "converter_unavailable",
                ConversionError::TimedOut { .. } => "conversion_timed_out",
            },
            Error::Delivery(_) => "delivery_failed",
            Error::NotFound(_) => "not_found",
            Error::InvalidFilename(_) => "invalid_filename",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::RequestBody { .. } => "invalid_request_body",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::Conversion { format, source } => ApiError::with_details(
                format!("Failed to convert to {format}"),
                source.diagnostics(),
            ),
            Error::Delivery(details) => ApiError::with_details("Failed to send to Kindle", details),
            Error::NotFound(_) => ApiError::file_not_found(),
            Error::InvalidFilename(name) => ApiError::with_details("Invalid filename", name),
            Error::RequestBody { message, .. } => {
                ApiError::with_details("Invalid request body", message)
            }
            other => {
                let traceback = render_traceback(&other);
                ApiError::unexpected(other.to_string(), traceback)
            }
        }
    }
}

/// Render the source chain of `error` followed by the current span trace
fn render_traceback(error: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = vec![format!("Error: {error}")];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {cause}"));
        source = cause.source();
    }

    let span_trace = SpanTrace::capture().to_string();
    if !span_trace.trim().is_empty() {
        lines.push(String::from("Span trace:"));
        lines.push(span_trace);
    }

    lines.join("\n")
}
