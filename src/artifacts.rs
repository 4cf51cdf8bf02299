//! Artifact naming and lookup under the output directory
//!
//! Every request writes `<base>.html`, `<base>.epub` and optionally
//! `<base>.<device-ext>` into one directory. The base name is either fixed or
//! derived from the calendar date, so later requests overwrite earlier ones.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Prefix of date-derived base names
pub const DATED_PREFIX: &str = "Digest_";

/// How artifact base names are chosen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// Same base name for every request (e.g. `daily_digest`)
    Fixed {
        /// Base name without extension
        base_name: String,
    },
    /// `Digest_YYYY-MM-DD` (default)
    #[default]
    Dated,
}

impl ArtifactNaming {
    /// Base name for a digest produced on `date`
    pub fn base_name(&self, date: NaiveDate) -> String {
        match self {
            ArtifactNaming::Fixed { base_name } => base_name.clone(),
            ArtifactNaming::Dated => format!("{DATED_PREFIX}{}", date.format("%Y-%m-%d")),
        }
    }

    /// Heading label rendered at the top of the digest, dated scheme only
    pub fn date_label(&self, date: NaiveDate) -> Option<String> {
        match self {
            ArtifactNaming::Fixed { .. } => None,
            ArtifactNaming::Dated => Some(date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Paths of the artifacts produced by one pipeline run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSet {
    /// Rendered HTML source
    pub html: PathBuf,
    /// Intermediate EPUB
    pub epub: PathBuf,
    /// Device-format file, when the second stage is enabled
    pub device: Option<PathBuf>,
}

impl ArtifactSet {
    /// The file that gets delivered and linked for download
    pub fn final_artifact(&self) -> &Path {
        self.device.as_deref().unwrap_or(&self.epub)
    }

    /// File name of [`final_artifact`](Self::final_artifact)
    pub fn final_file_name(&self) -> String {
        self.final_artifact()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The fixed directory holding generated artifacts
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory artifacts are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact paths for `base_name`, with an optional device-format extension
    pub fn artifact_set(&self, base_name: &str, device_format: Option<&str>) -> ArtifactSet {
        ArtifactSet {
            html: self.root.join(format!("{base_name}.html")),
            epub: self.root.join(format!("{base_name}.epub")),
            device: device_format.map(|ext| self.root.join(format!("{base_name}.{ext}"))),
        }
    }

    /// Resolve a download request to an existing file inside the store
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFilename`] if `filename` is not a plain file name
    /// - [`Error::NotFound`] if no such artifact exists
    pub async fn locate(&self, filename: &str) -> Result<PathBuf> {
        if !is_valid_artifact_name(filename) {
            return Err(Error::InvalidFilename(filename.to_string()));
        }

        let path = self.root.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(Error::NotFound(filename.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(filename.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Whether `name` is a single normal path component with no separators
pub fn is_valid_artifact_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
