//! Metrics collection module
//!
//! Tracks research run outcomes, search reliability and stage timings.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-wide research counters, shared by every run
#[derive(Debug, Default)]
pub struct ResearchMetrics {
    runs_started: AtomicU64,
    runs_completed: AtomicU64,
    runs_aborted: AtomicU64,
    advisories: AtomicU64,
    searches_succeeded: AtomicU64,
    searches_failed: AtomicU64,
    planning_ms: AtomicU64,
    searching_ms: AtomicU64,
    writing_ms: AtomicU64,
}

/// Which timed stage a duration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedStage {
    Planning,
    Searching,
    Writing,
}

impl ResearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_aborted(&self) {
        self.runs_aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Empty query turned away before any capability call
    pub fn record_advisory(&self) {
        self.advisories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search(&self, succeeded: bool) {
        if succeeded {
            self.searches_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.searches_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_stage(&self, stage: TimedStage, elapsed: Duration) {
        let ms = elapsed.as_millis() as u64;
        let counter = match stage {
            TimedStage::Planning => &self.planning_ms,
            TimedStage::Searching => &self.searching_ms,
            TimedStage::Writing => &self.writing_ms,
        };
        counter.fetch_add(ms, Ordering::Relaxed);
    }

    /// Percentage of searches that produced a finding
    pub fn search_reliability(&self) -> f64 {
        let ok = self.searches_succeeded.load(Ordering::Relaxed);
        let failed = self.searches_failed.load(Ordering::Relaxed);
        let total = ok + failed;
        if total == 0 {
            100.0
        } else {
            (ok as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let started = self.runs_started.load(Ordering::Relaxed);
        let average = |counter: &AtomicU64| {
            if started == 0 {
                None
            } else {
                Some(counter.load(Ordering::Relaxed) / started)
            }
        };

        MetricsSnapshot {
            runs_started: started,
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_aborted: self.runs_aborted.load(Ordering::Relaxed),
            advisories: self.advisories.load(Ordering::Relaxed),
            searches_succeeded: self.searches_succeeded.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
            search_reliability: self.search_reliability(),
            avg_planning_ms: average(&self.planning_ms),
            avg_searching_ms: average(&self.searching_ms),
            avg_writing_ms: average(&self.writing_ms),
        }
    }
}

/// Point-in-time copy of the counters, for display
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_aborted: u64,
    pub advisories: u64,
    pub searches_succeeded: u64,
    pub searches_failed: u64,
    pub search_reliability: f64,
    pub avg_planning_ms: Option<u64>,
    pub avg_searching_ms: Option<u64>,
    pub avg_writing_ms: Option<u64>,
}
