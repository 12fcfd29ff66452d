use thiserror::Error;

/// Why a page fetch produced no HTML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outcomes that end a sync pass without a report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The profile page could not be retrieved at all.
    #[error("profile page unavailable: {0}")]
    ProfileUnavailable(FetchFailure),
    /// The page was fetched but no extraction strategy found a project.
    /// Either the profile is empty or its markup changed shape.
    #[error("no projects found on profile page ({page_bytes} bytes fetched)")]
    NoProjectsFound { page_bytes: usize },
    #[error("storage error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl SyncError {
    /// Short tag stored with the sync run.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ProfileUnavailable(_) => "profile_unavailable",
            SyncError::NoProjectsFound { .. } => "no_projects_found",
            SyncError::Store(_) => "store",
        }
    }
}
