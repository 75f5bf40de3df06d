use std::sync::Arc;

use crate::github_client::GitHubClient;
use crate::resume::archive::ExportArchive;
use crate::resume::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable résumé store. Postgres when `DATABASE_URL` is set, memory otherwise.
    pub store: Arc<dyn ResumeStore>,
    /// Present only when `S3_BUCKET` is configured.
    pub archive: Option<ExportArchive>,
    pub github: GitHubClient,
}
