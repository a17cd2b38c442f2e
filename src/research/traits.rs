//! Capability traits consumed by the research orchestrator
//!
//! Each capability is an external, provider-owned operation. The orchestrator
//! only ever sees these traits, so providers can be swapped without touching
//! the pipeline.

use super::models::{ReportDocument, SearchDirective, SearchFinding, SearchPlan};
use async_trait::async_trait;

/// Turns a raw query into a plan of web searches
#[async_trait]
pub trait Plans: Send + Sync {
    async fn plan(&self, query: &str) -> anyhow::Result<SearchPlan>;
}

/// Runs one planned search and summarizes what it found
#[async_trait]
pub trait Searches: Send + Sync {
    async fn search(&self, directive: &SearchDirective) -> anyhow::Result<SearchFinding>;
}

/// Synthesizes findings into a structured report
///
/// `findings` may be empty when every search failed.
#[async_trait]
pub trait Writes: Send + Sync {
    async fn write(&self, query: &str, findings: &[SearchFinding])
        -> anyhow::Result<ReportDocument>;
}
