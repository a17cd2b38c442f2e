//! Per-run research data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A single planned web search with the planner's rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDirective {
    /// Why this search helps answer the query
    pub reason: String,
    /// The search term to use
    pub query: String,
}

impl SearchDirective {
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// Ordered set of searches produced once per run by the planner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub searches: Vec<SearchDirective>,
}

impl SearchPlan {
    pub fn new(searches: Vec<SearchDirective>) -> Self {
        Self { searches }
    }

    /// Number of directives, i.e. the fan-out degree of the search stage
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    /// Keep at most `max` directives
    pub fn truncate(&mut self, max: usize) {
        self.searches.truncate(max);
    }
}

/// Free-text summary produced by one successful search
pub type SearchFinding = String;

/// Structured report produced once per run by the writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Two or three sentence summary of the findings
    pub short_summary: String,
    /// The full report body in markdown
    pub markdown_report: String,
    /// Suggested topics to research further
    pub follow_up_questions: Vec<String>,
}

/// A run that went all the way through persistence
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRun {
    pub run_id: String,
    pub query: String,
    pub report: ReportDocument,
    /// Where the rendered report was written
    pub saved_path: PathBuf,
    /// Directives issued by the planner
    pub searches: usize,
    /// Findings that reached the writer
    pub findings: usize,
}

/// What a call to `run` produces
#[derive(Debug, Clone)]
pub enum ResearchOutput {
    /// User-facing notice; no capability was invoked
    Advisory(String),
    Completed(Box<CompletedRun>),
}

impl ResearchOutput {
    /// The single value handed to the caller: the advisory or the report body
    pub fn into_text(self) -> String {
        match self {
            ResearchOutput::Advisory(text) => text,
            ResearchOutput::Completed(run) => run.report.markdown_report,
        }
    }

    pub fn is_advisory(&self) -> bool {
        matches!(self, ResearchOutput::Advisory(_))
    }

    pub fn completed(&self) -> Option<&CompletedRun> {
        match self {
            ResearchOutput::Completed(run) => Some(run),
            ResearchOutput::Advisory(_) => None,
        }
    }
}

/// Lifecycle of a single research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Idle,
    Planning,
    Searching,
    Writing,
    Persisting,
    Done,
    Aborted,
}

impl RunStage {
    /// Whether a run in this stage may move to `next`
    ///
    /// Runs only move forward. Searching aborts only when the overall run
    /// deadline expires; individual search failures never abort.
    pub fn can_advance_to(self, next: RunStage) -> bool {
        use RunStage::*;
        matches!(
            (self, next),
            (Idle, Planning)
                | (Planning, Searching)
                | (Searching, Writing)
                | (Writing, Persisting)
                | (Persisting, Done)
                | (Planning, Aborted)
                | (Searching, Aborted)
                | (Writing, Aborted)
                | (Persisting, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStage::Done | RunStage::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStage::Idle => "idle",
            RunStage::Planning => "planning",
            RunStage::Searching => "searching",
            RunStage::Writing => "writing",
            RunStage::Persisting => "persisting",
            RunStage::Done => "done",
            RunStage::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
