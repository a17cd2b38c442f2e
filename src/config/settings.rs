//! Settings structures for deep-research-rs configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure, mirrors settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub research: ResearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (RESEARCH_* prefix plus the OpenAI pair)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("RESEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("RESEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("RESEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("RESEARCH_OUTPUT_DIR") {
            self.research.output_dir = PathBuf::from(val);
        }
        if let Some(val) = var("RESEARCH_SEARCH_COUNT") {
            if let Ok(count) = val.parse() {
                self.research.search_count = count;
            }
        }
        if let Some(val) = var("RESEARCH_SEARCH_BACKEND") {
            match val.to_lowercase().as_str() {
                "hosted" => self.research.search_backend = SearchBackend::Hosted,
                "duckduckgo" => self.research.search_backend = SearchBackend::DuckDuckGo,
                _ => {}
            }
        }
        if let Some(val) = var("OPENAI_API_KEY") {
            if !val.trim().is_empty() {
                self.llm.api_key = Some(val);
            }
        }
        if let Some(val) = var("OPENAI_BASE_URL") {
            self.llm.base_url = val;
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name displayed in UI
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "Deep Research Agent".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 7860,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// LLM provider settings (any OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// API key, usually supplied via OPENAI_API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model used for search planning
    pub planner_model: String,
    /// Model used for web search summaries
    pub search_model: String,
    /// Model used for report writing
    pub writer_model: String,
    /// Request timeout in seconds for a single LLM call
    pub request_timeout: f64,
    /// Hosted web search context size: "low", "medium" or "high"
    pub search_context_size: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            planner_model: "gpt-4o-mini".to_string(),
            search_model: "gpt-4o-mini".to_string(),
            writer_model: "gpt-4o-mini".to_string(),
            request_timeout: 300.0,
            search_context_size: "low".to_string(),
        }
    }
}

/// Which searcher implementation backs the search stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// Provider-hosted web search tool
    #[default]
    Hosted,
    /// DuckDuckGo HTML results summarized by the search model
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
}

/// Research pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    /// Number of searches the planner is asked for
    pub search_count: usize,
    /// Directory where reports are written
    pub output_dir: PathBuf,
    /// Raw query characters kept before filename sanitization
    pub query_prefix_len: usize,
    /// Searcher implementation
    pub search_backend: SearchBackend,
    /// Per-search timeout in seconds (none = wait for the provider)
    pub search_timeout_secs: Option<f64>,
    /// Whole-run deadline in seconds (none = unbounded)
    pub run_timeout_secs: Option<f64>,
    /// Hits fed to the summarizer when using the duckduckgo backend
    pub max_hits_per_search: usize,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            search_count: crate::DEFAULT_SEARCH_COUNT,
            output_dir: PathBuf::from("outputs"),
            query_prefix_len: crate::QUERY_PREFIX_LEN,
            search_backend: SearchBackend::default(),
            search_timeout_secs: None,
            run_timeout_secs: None,
            max_hits_per_search: 8,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds for scraping requests
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
