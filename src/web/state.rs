//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::ResearchMetrics;
use crate::report::ReportStore;
use crate::research::ResearchManager;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Research orchestrator, shared by every request
    pub manager: Arc<ResearchManager>,
    /// Template renderer
    pub templates: Arc<super::Templates>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, manager: ResearchManager) -> anyhow::Result<Self> {
        let templates = Arc::new(super::Templates::new()?);

        Ok(Self {
            settings: Arc::new(settings),
            manager: Arc::new(manager),
            templates,
        })
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// The directory reports are saved to and read from
    pub fn reports(&self) -> &ReportStore {
        self.manager.store()
    }

    pub fn metrics(&self) -> &ResearchMetrics {
        self.manager.metrics()
    }
}
