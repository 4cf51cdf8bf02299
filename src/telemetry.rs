//! Tracing subscriber installation

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default `info` level. The [`ErrorLayer`] lets
/// error responses carry a span trace.
///
/// # Errors
///
/// Returns [`Error::Other`] if a global subscriber is already installed.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| Error::Other(format!("failed to install tracing subscriber: {err}")))
}
