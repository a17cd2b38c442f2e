//! Fatal research run errors

use super::models::RunStage;
use crate::report::ReportError;
use std::time::Duration;

/// Failures that abort a research run
///
/// A failed search is not represented here: it is logged and dropped inside
/// the search stage. An empty query is not an error either; it produces an
/// advisory output.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("search planning failed: {0:#}")]
    Planning(#[source] anyhow::Error),

    #[error("report writing failed: {0:#}")]
    Writing(#[source] anyhow::Error),

    #[error("failed to save report: {0}")]
    Persistence(#[from] ReportError),

    #[error("research run exceeded its {0:?} deadline")]
    Timeout(Duration),
}

impl ResearchError {
    /// Stage the run was in when it failed, if tied to one
    pub fn stage(&self) -> Option<RunStage> {
        match self {
            ResearchError::Planning(_) => Some(RunStage::Planning),
            ResearchError::Writing(_) => Some(RunStage::Writing),
            ResearchError::Persistence(_) => Some(RunStage::Persisting),
            ResearchError::Timeout(_) => None,
        }
    }
}
