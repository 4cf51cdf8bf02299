//! Trait for ebook format conversion

use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::Path;

/// Converts one document file into another format
///
/// The target format is implied by the extension of `output`.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Convert `input` into `output`, overwriting `output` if it exists
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] if:
    /// - The converter cannot be started
    /// - It exits unsuccessfully (the error carries its diagnostic output verbatim)
    /// - It exceeds the configured timeout
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
