//! Research providers backed by an OpenAI-compatible API
//!
//! Wires the planner, searcher and writer implementations into a
//! [`ResearchManager`] according to the loaded settings.

mod planner;
mod prompts;
mod searcher;
mod writer;

pub use planner::LlmPlanner;
pub use searcher::{EngineSearcher, HostedSearcher};
pub use writer::LlmWriter;

use crate::config::{SearchBackend, Settings};
use crate::engines::DuckDuckGo;
use crate::llm::LlmClient;
use crate::metrics::ResearchMetrics;
use crate::network::HttpClient;
use crate::report::ReportStore;
use crate::research::{ResearchManager, Searches};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build a research manager from settings
pub fn build_manager(
    settings: &Settings,
    http: &HttpClient,
    metrics: Arc<ResearchMetrics>,
) -> anyhow::Result<ResearchManager> {
    let llm = LlmClient::new(http.inner().clone(), &settings.llm)?;
    if !llm.has_api_key() {
        warn!("OPENAI_API_KEY is not set; LLM calls may be rejected");
    }

    let research = &settings.research;
    if research.search_count == 0 {
        warn!("research.search_count is 0; reports will be written without findings");
    }

    let planner = Arc::new(LlmPlanner::new(
        llm.clone(),
        &settings.llm.planner_model,
        research.search_count,
    ));

    let searcher: Arc<dyn Searches> = match research.search_backend {
        SearchBackend::Hosted => Arc::new(HostedSearcher::new(
            llm.clone(),
            &settings.llm.search_model,
            &settings.llm.search_context_size,
        )),
        SearchBackend::DuckDuckGo => Arc::new(EngineSearcher::new(
            http.clone(),
            Arc::new(DuckDuckGo::new()),
            llm.clone(),
            &settings.llm.search_model,
            research.max_hits_per_search,
        )),
    };
    info!("Search backend: {:?}", research.search_backend);

    let writer = Arc::new(LlmWriter::new(llm, &settings.llm.writer_model));
    let store = ReportStore::new(&research.output_dir, research.query_prefix_len);

    Ok(ResearchManager::new(planner, searcher, writer, store)
        .with_metrics(metrics)
        .with_search_timeout(seconds(research.search_timeout_secs)?)
        .with_run_timeout(seconds(research.run_timeout_secs)?))
}

fn seconds(value: Option<f64>) -> anyhow::Result<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|e| anyhow::anyhow!("invalid timeout {}: {}", secs, e))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_manager_from_defaults() {
        let mut settings = Settings::default();
        settings.research.output_dir = "reports-out".into();
        settings.research.search_backend = SearchBackend::DuckDuckGo;

        let metrics = Arc::new(ResearchMetrics::new());
        let manager = tokio_test::assert_ok!(build_manager(
            &settings,
            &HttpClient::new().unwrap(),
            metrics.clone()
        ));

        assert_eq!(manager.store().dir(), std::path::Path::new("reports-out"));
        assert!(Arc::ptr_eq(manager.metrics(), &metrics));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let mut settings = Settings::default();
        settings.research.search_timeout_secs = Some(-1.0);

        let result = build_manager(
            &settings,
            &HttpClient::new().unwrap(),
            Arc::new(ResearchMetrics::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_nan_llm_timeout_rejected() {
        let mut settings = Settings::default();
        settings.llm.request_timeout = f64::NAN;

        let result = build_manager(
            &settings,
            &HttpClient::new().unwrap(),
            Arc::new(ResearchMetrics::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(None).unwrap(), None);
        assert_eq!(seconds(Some(1.5)).unwrap(), Some(Duration::from_millis(1500)));
    }
}
