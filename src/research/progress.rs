//! Progress side-channel for research runs
//!
//! Progress events are advisory: they are logged through `tracing` and, when a
//! subscriber is attached, forwarded over an unbounded channel. Nothing
//! downstream depends on them.

use super::models::RunStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Human-readable status updates emitted while a run progresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    RunStarted { run_id: String, query: String },
    PlanningStarted,
    Planned { searches: usize },
    SearchingStarted { searches: usize },
    SearchSucceeded { query: String },
    SearchFailed { query: String, error: String },
    SearchesCompleted {
        succeeded: usize,
        total: usize,
        elapsed_ms: u64,
    },
    WritingStarted { findings: usize },
    ReportWritten { chars: usize },
    ReportSaved { path: String },
    RunCompleted { elapsed_ms: u64 },
    RunAborted { stage: RunStage, error: String },
}

impl ProgressEvent {
    /// Whether this event reports something that went wrong
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ProgressEvent::SearchFailed { .. } | ProgressEvent::RunAborted { .. }
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::RunStarted { run_id, query } => {
                write!(f, "🔍 Research run {} started: {}", run_id, query)
            }
            ProgressEvent::PlanningStarted => write!(f, "📋 Planning searches..."),
            ProgressEvent::Planned { searches } => write!(f, "✅ Planned {} searches", searches),
            ProgressEvent::SearchingStarted { searches } => {
                write!(f, "🌐 Executing {} searches...", searches)
            }
            ProgressEvent::SearchSucceeded { query } => write!(f, "🔎 Search done: {}", query),
            ProgressEvent::SearchFailed { query, error } => {
                write!(f, "⚠️ Search failed: {} - {}", query, error)
            }
            ProgressEvent::SearchesCompleted {
                succeeded,
                total,
                elapsed_ms,
            } => write!(
                f,
                "✅ Completed {} of {} searches in {:.1}s",
                succeeded,
                total,
                *elapsed_ms as f64 / 1000.0
            ),
            ProgressEvent::WritingStarted { findings } => {
                write!(f, "📝 Writing report from {} findings...", findings)
            }
            ProgressEvent::ReportWritten { chars } => {
                write!(f, "✅ Report complete ({} chars)", chars)
            }
            ProgressEvent::ReportSaved { path } => write!(f, "💾 Saved: {}", path),
            ProgressEvent::RunCompleted { elapsed_ms } => write!(
                f,
                "🏁 Research finished in {:.1}s",
                *elapsed_ms as f64 / 1000.0
            ),
            ProgressEvent::RunAborted { stage, error } => {
                write!(f, "❌ Research aborted during {}: {}", stage, error)
            }
        }
    }
}

/// Sender half of a progress channel
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Receiver half of a progress channel
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Create a new progress channel
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Emits progress to the log and to an optional subscriber
#[derive(Clone, Default)]
pub struct Progress {
    sender: Option<ProgressSender>,
}

impl Progress {
    pub fn new(sender: Option<ProgressSender>) -> Self {
        Self { sender }
    }

    /// Progress that only goes to the log
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if event.is_warning() {
            warn!("{}", event);
        } else {
            info!("{}", event);
        }

        if let Some(ref sender) = self.sender {
            // A dropped receiver just means nobody is watching any more
            let _ = sender.send(event);
        }
    }
}
