//! Configuration types for kindle-digest
//!
//! Configuration is read once at startup (see [`Config::from_env`]) and shared
//! immutably behind an `Arc` by the pipeline, the delivery strategy and the
//! API router.

use crate::artifacts::{ArtifactNaming, is_valid_artifact_name};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Default Mailgun API base URL
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Default SMTP submission host
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Main configuration for the digest service
///
/// Fields are organized into logical sub-configs:
/// - [`output`](OutputConfig) - artifact directory, naming, device format
/// - [`converter`](ConverterConfig) - external converter binary and timeout
/// - [`delivery`](DeliveryConfig) - recipient and the selected transport
/// - [`api`](ApiConfig) - HTTP listener settings
/// - [`logging`](LoggingConfig) - subscriber format
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how artifacts are written
    #[serde(default)]
    pub output: OutputConfig,

    /// External converter settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Recipient and transport selection
    pub delivery: DeliveryConfig,

    /// HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Artifact output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding generated artifacts (default: "/app")
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Fixed base name or date-derived names (default: dated)
    #[serde(default)]
    pub naming: ArtifactNaming,

    /// Extension of the second conversion stage (default: "mobi")
    ///
    /// `None` delivers the EPUB directly.
    #[serde(default = "default_device_format")]
    pub device_format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            naming: ArtifactNaming::default(),
            device_format: default_device_format(),
        }
    }
}

/// External converter configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the converter executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Maximum time a single conversion may take (default: 300 seconds)
    #[serde(default = "default_convert_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            timeout: default_convert_timeout(),
        }
    }
}

/// Delivery configuration: the fixed recipient plus exactly one transport
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Kindle address every digest is sent to
    pub recipient: String,

    /// The transport used for this deployment
    pub transport: TransportConfig,

    /// Network timeout for a single delivery (default: 60 seconds)
    #[serde(default = "default_delivery_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            transport: TransportConfig::Smtp(SmtpConfig::default()),
            timeout: default_delivery_timeout(),
        }
    }
}

/// Which delivery strategy to instantiate
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Mailgun HTTP API
    Mailgun(MailgunConfig),
    /// Authenticated SMTP session with STARTTLS
    Smtp(SmtpConfig),
}

impl TransportConfig {
    /// Short transport name for logging
    pub fn name(&self) -> &'static str {
        match self {
            TransportConfig::Mailgun(_) => "mailgun",
            TransportConfig::Smtp(_) => "smtp",
        }
    }
}

/// Mailgun API credentials
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MailgunConfig {
    /// API key used as the basic-auth password
    pub api_key: String,
    /// Sending domain
    pub domain: String,
    /// Sender address
    pub from: String,
    /// API base URL (default: "https://api.mailgun.net/v3")
    #[serde(default = "default_mailgun_api_base")]
    pub api_base: String,
}

/// SMTP account credentials
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Submission host (default: "smtp.gmail.com")
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// Submission port (default: 587)
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Account address, also used as the sender
    pub username: String,
    /// Account app password
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// HTTP API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind the API server to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable a permissive CORS layer (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Mount Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,

    /// Upper bound on a `/convert` request body in bytes (default: unlimited)
    #[serde(default)]
    pub max_request_body: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            swagger_ui: false,
            max_request_body: None,
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format of the tracing subscriber
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output (default)
    #[default]
    Compact,
    /// One JSON object per line
    Json,
}

impl Config {
    /// Build the configuration from process environment variables
    ///
    /// # Required Environment Variables
    /// - `KINDLE_EMAIL`: recipient address
    /// - `DELIVERY_TRANSPORT`: `mailgun` or `smtp`
    /// - for `mailgun`: `MAILGUN_API_KEY`, `MAILGUN_DOMAIN`, `FROM_EMAIL`
    /// - for `smtp`: `GMAIL_USER`, `GMAIL_APP_PASSWORD`
    ///
    /// # Optional Environment Variables
    /// - `MAILGUN_API_BASE`, `SMTP_HOST`, `SMTP_PORT`
    /// - `DIGEST_OUTPUT_DIR`, `DIGEST_BASE_NAME`, `DIGEST_DEVICE_FORMAT`
    /// - `EBOOK_CONVERT_PATH`, `CONVERT_TIMEOUT_SECS`, `DELIVERY_TIMEOUT_SECS`
    /// - `BIND_ADDRESS`, `CORS_ENABLED`, `SWAGGER_UI`, `MAX_REQUEST_BODY_BYTES`
    /// - `LOG_FORMAT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset. The result is validated before it
    /// is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| Error::Config {
                message: format!("{key} environment variable not set"),
                key: Some(key.to_string()),
            })
        };

        let transport = match require("DELIVERY_TRANSPORT")?.to_ascii_lowercase().as_str() {
            "mailgun" => TransportConfig::Mailgun(MailgunConfig {
                api_key: require("MAILGUN_API_KEY")?,
                domain: require("MAILGUN_DOMAIN")?,
                from: require("FROM_EMAIL")?,
                api_base: get("MAILGUN_API_BASE").unwrap_or_else(default_mailgun_api_base),
            }),
            "smtp" | "gmail" => TransportConfig::Smtp(SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(default_smtp_host),
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                username: require("GMAIL_USER")?,
                password: require("GMAIL_APP_PASSWORD")?,
            }),
            other => {
                return Err(Error::Config {
                    message: format!("unknown delivery transport '{other}' (expected mailgun or smtp)"),
                    key: Some("DELIVERY_TRANSPORT".to_string()),
                });
            }
        };

        let naming = match get("DIGEST_BASE_NAME") {
            Some(base_name) => ArtifactNaming::Fixed { base_name },
            None => ArtifactNaming::Dated,
        };

        let device_format = match get("DIGEST_DEVICE_FORMAT") {
            Some(format) if format.eq_ignore_ascii_case("none") => None,
            Some(format) => Some(format.trim_start_matches('.').to_ascii_lowercase()),
            None => default_device_format(),
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("compact") | None => LogFormat::Compact,
            Some(other) => {
                return Err(Error::Config {
                    message: format!("unknown log format '{other}' (expected compact or json)"),
                    key: Some("LOG_FORMAT".to_string()),
                });
            }
        };

        let config = Config {
            output: OutputConfig {
                directory: get("DIGEST_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_output_dir),
                naming,
                device_format,
            },
            converter: ConverterConfig {
                binary_path: get("EBOOK_CONVERT_PATH").map(PathBuf::from),
                timeout: Duration::from_secs(parse_or(
                    "CONVERT_TIMEOUT_SECS",
                    get("CONVERT_TIMEOUT_SECS"),
                    default_convert_timeout().as_secs(),
                )?),
            },
            delivery: DeliveryConfig {
                recipient: require("KINDLE_EMAIL")?,
                transport,
                timeout: Duration::from_secs(parse_or(
                    "DELIVERY_TIMEOUT_SECS",
                    get("DELIVERY_TIMEOUT_SECS"),
                    default_delivery_timeout().as_secs(),
                )?),
            },
            api: ApiConfig {
                bind_address: parse_or("BIND_ADDRESS", get("BIND_ADDRESS"), default_bind_address())?,
                cors_enabled: parse_or("CORS_ENABLED", get("CORS_ENABLED"), true)?,
                swagger_ui: parse_or("SWAGGER_UI", get("SWAGGER_UI"), false)?,
                max_request_body: get("MAX_REQUEST_BODY_BYTES")
                    .map(|raw| parse_or("MAX_REQUEST_BODY_BYTES", Some(raw), 0))
                    .transpose()?,
            },
            logging: LoggingConfig { format: log_format },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would only fail at request time
    pub fn validate(&self) -> Result<()> {
        if !self.delivery.recipient.contains('@') {
            return Err(config_error("recipient is not an email address", "KINDLE_EMAIL"));
        }

        match &self.delivery.transport {
            TransportConfig::Mailgun(mailgun) => {
                if mailgun.api_key.is_empty() {
                    return Err(config_error("Mailgun API key is empty", "MAILGUN_API_KEY"));
                }
                if mailgun.domain.is_empty() {
                    return Err(config_error("Mailgun domain is empty", "MAILGUN_DOMAIN"));
                }
                if !mailgun.from.contains('@') {
                    return Err(config_error("sender is not an email address", "FROM_EMAIL"));
                }
                url::Url::parse(&mailgun.api_base).map_err(|e| Error::Config {
                    message: format!("invalid Mailgun API base URL: {e}"),
                    key: Some("MAILGUN_API_BASE".to_string()),
                })?;
            }
            TransportConfig::Smtp(smtp) => {
                if smtp.host.is_empty() {
                    return Err(config_error("SMTP host is empty", "SMTP_HOST"));
                }
                if !smtp.username.contains('@') {
                    return Err(config_error("SMTP user is not an email address", "GMAIL_USER"));
                }
                if smtp.password.is_empty() {
                    return Err(config_error("SMTP password is empty", "GMAIL_APP_PASSWORD"));
                }
            }
        }

        if let ArtifactNaming::Fixed { base_name } = &self.output.naming
            && !is_valid_artifact_name(base_name)
        {
            return Err(config_error(
                "base name must be a plain file name",
                "DIGEST_BASE_NAME",
            ));
        }

        if let Some(format) = &self.output.device_format
            && (format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(config_error(
                "device format must be a bare file extension",
                "DIGEST_DEVICE_FORMAT",
            ));
        }

        if self.converter.timeout.is_zero() {
            return Err(config_error("timeout must be positive", "CONVERT_TIMEOUT_SECS"));
        }
        if self.delivery.timeout.is_zero() {
            return Err(config_error("timeout must be positive", "DELIVERY_TIMEOUT_SECS"));
        }

        Ok(())
    }
}

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e| Error::Config {
            message: format!("invalid value '{raw}': {e}"),
            key: Some(key.to_string()),
        }),
        None => Ok(default),
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/app")
}

fn default_device_format() -> Option<String> {
    Some(String::from("mobi"))
}

fn default_convert_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_delivery_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_mailgun_api_base() -> String {
    DEFAULT_MAILGUN_API_BASE.to_string()
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

// Duration serialization helpers (as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
