//! Application state for the API server

use crate::Config;
use crate::artifacts::ArtifactStore;
use crate::pipeline::DigestPipeline;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The convert-and-deliver pipeline
    pub pipeline: Arc<DigestPipeline>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(pipeline: Arc<DigestPipeline>, config: Arc<Config>) -> Self {
        Self { pipeline, config }
    }

    /// Artifact directory served by the download endpoint
    pub fn store(&self) -> &ArtifactStore {
        self.pipeline.store()
    }
}
