use std::sync::Arc;

use crate::config::Config;
use crate::interview::engine::InterviewEngine;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InterviewEngine>,
    /// Uploaded resumes. S3/MinIO in production.
    pub documents: Arc<dyn DocumentStore>,
    pub config: Config,
}
