//! deep-research-rs: a multi-agent research assistant
//!
//! A query is turned into a plan of web searches, the searches run
//! concurrently, and the surviving findings are written up as a markdown
//! report that is saved to disk and returned to the caller.

pub mod agents;
pub mod config;
pub mod engines;
pub mod llm;
pub mod metrics;
pub mod network;
pub mod report;
pub mod research;
pub mod web;

pub use config::Settings;
pub use report::{ReportError, ReportStore};
pub use research::{ResearchError, ResearchManager, ResearchOutput};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Searches the planner is asked for when not configured
pub const DEFAULT_SEARCH_COUNT: usize = 5;

/// Raw query characters considered for the report filename
pub const QUERY_PREFIX_LEN: usize = 50;
