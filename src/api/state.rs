//! Application state for the API server

use crate::PipelineOrchestrator;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Runs quiz pipelines; its configuration is the one requests are validated against
    pub orchestrator: Arc<PipelineOrchestrator>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(orchestrator: Arc<PipelineOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
