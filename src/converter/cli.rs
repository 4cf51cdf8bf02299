//! CLI-based converter using the external ebook-convert binary

use super::traits::FormatConverter;
use crate::config::ConverterConfig;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Name of the converter binary looked up in PATH
pub const DEFAULT_BINARY: &str = "ebook-convert";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Converter that shells out to `ebook-convert <input> <output>`
///
/// The child process is killed if it outlives the configured timeout.
pub struct CliConverter {
    binary_path: PathBuf,
    timeout: Duration,
}

impl CliConverter {
    /// Create a new CLI converter with an explicit binary path
    ///
    /// # Arguments
    ///
    /// * `binary_path` - Path to the ebook-convert binary
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attempt to find ebook-convert in PATH
    ///
    /// # Returns
    ///
    /// `Some(CliConverter)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_BINARY).ok().map(Self::new)
    }

    /// Build a converter from configuration
    ///
    /// An explicit path wins; otherwise PATH is searched. If nothing is found
    /// the bare binary name is kept so that the failure surfaces per request
    /// as a conversion error instead of preventing startup.
    pub fn from_config(config: &ConverterConfig) -> Self {
        let converter = match &config.binary_path {
            Some(path) => Self::new(path.clone()),
            None => Self::from_path().unwrap_or_else(|| {
                tracing::warn!(
                    binary = DEFAULT_BINARY,
                    "converter not found in PATH, conversions will fail until it is installed"
                );
                Self::new(PathBuf::from(DEFAULT_BINARY))
            }),
        };
        converter.with_timeout(config.timeout)
    }

    /// Replace the per-conversion timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the binary this converter runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

#[async_trait]
impl FormatConverter for CliConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        tracing::debug!(
            binary = %self.binary_path.display(),
            input = %input.display(),
            output = %output.display(),
            "running converter"
        );

        let child = Command::new(&self.binary_path)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConversionError::Spawn {
                program: self.binary_path.clone(),
                reason: e.to_string(),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output_result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConversionError::TimedOut {
                after: self.timeout,
            })?;

        let process_output = output_result.map_err(|e| ConversionError::Spawn {
            program: self.binary_path.clone(),
            reason: e.to_string(),
        })?;

        if process_output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&process_output.stderr).into_owned();
        let diagnostics = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&process_output.stdout).into_owned()
        } else {
            stderr
        };

        Err(ConversionError::Failed {
            output: output.to_path_buf(),
            status: process_output.status.code(),
            diagnostics,
        })
    }

    fn name(&self) -> &'static str {
        "cli-ebook-convert"
    }
}
