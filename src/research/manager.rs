//! Research orchestration: plan, fan out searches, write, persist

use super::error::ResearchError;
use super::models::{
    CompletedRun, ReportDocument, ResearchOutput, RunStage, SearchDirective, SearchFinding,
    SearchPlan,
};
use super::progress::{Progress, ProgressEvent, ProgressSender};
use super::traits::{Plans, Searches, Writes};
use crate::metrics::{ResearchMetrics, TimedStage};
use crate::report::ReportStore;
use chrono::Local;
use futures::stream::{self, BoxStream, FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

/// Advisory returned for empty queries
pub const EMPTY_QUERY_ADVISORY: &str = "⚠️ Please enter a research query";

/// Drives research runs from a raw query to a saved report
///
/// A manager holds no per-run state and can serve any number of concurrent
/// runs.
pub struct ResearchManager {
    planner: Arc<dyn Plans>,
    searcher: Arc<dyn Searches>,
    writer: Arc<dyn Writes>,
    store: ReportStore,
    metrics: Arc<ResearchMetrics>,
    /// Applied to each search on its own
    search_timeout: Option<Duration>,
    /// Applied to the whole run
    run_timeout: Option<Duration>,
}

impl ResearchManager {
    /// Create a new research manager
    pub fn new(
        planner: Arc<dyn Plans>,
        searcher: Arc<dyn Searches>,
        writer: Arc<dyn Writes>,
        store: ReportStore,
    ) -> Self {
        Self {
            planner,
            searcher,
            writer,
            store,
            metrics: Arc::new(ResearchMetrics::new()),
            search_timeout: None,
            run_timeout: None,
        }
    }

    /// Set the per-search timeout
    pub fn with_search_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Set the overall run deadline
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Share an existing metrics collector
    pub fn with_metrics(mut self, metrics: Arc<ResearchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<ResearchMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Run one research query to completion
    pub async fn run(&self, query: &str) -> Result<ResearchOutput, ResearchError> {
        self.run_with_progress(query, None).await
    }

    /// Run one research query, reporting progress to `progress` if given
    pub async fn run_with_progress(
        &self,
        query: &str,
        progress: Option<ProgressSender>,
    ) -> Result<ResearchOutput, ResearchError> {
        if query.trim().is_empty() {
            self.metrics.record_advisory();
            return Ok(ResearchOutput::Advisory(EMPTY_QUERY_ADVISORY.to_string()));
        }

        let run_id = Uuid::new_v4().to_string();
        let progress = Progress::new(progress);
        let span = info_span!("research_run", run_id = %run_id, query = %query);

        self.metrics.record_run_started();
        let started = Instant::now();

        let result = async {
            progress.emit(ProgressEvent::RunStarted {
                run_id: run_id.clone(),
                query: query.to_string(),
            });

            let mut run = RunState::new(&progress);
            let outcome = match self.run_timeout {
                Some(limit) => match timeout(limit, self.execute(&run_id, query, &mut run)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ResearchError::Timeout(limit)),
                },
                None => self.execute(&run_id, query, &mut run).await,
            };

            match outcome {
                Ok(completed) => {
                    progress.emit(ProgressEvent::RunCompleted {
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                    Ok(completed)
                }
                Err(e) => {
                    // The timed-out future is gone, so fall back to the last stage it reached
                    let stage = e.stage().unwrap_or(run.stage);
                    progress.emit(ProgressEvent::RunAborted {
                        stage,
                        error: e.to_string(),
                    });
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await;

        match result {
            Ok(completed) => {
                self.metrics.record_run_completed();
                Ok(ResearchOutput::Completed(Box::new(completed)))
            }
            Err(e) => {
                self.metrics.record_run_aborted();
                Err(e)
            }
        }
    }

    /// Lazy single-value form of [`run`](Self::run)
    ///
    /// Yields the advisory or the markdown report body, then ends. Dropping
    /// the stream before it yields abandons the run, including any in-flight
    /// searches.
    pub fn stream<'a>(&'a self, query: &'a str) -> BoxStream<'a, Result<String, ResearchError>> {
        stream::once(async move { self.run(query).await.map(ResearchOutput::into_text) }).boxed()
    }

    async fn execute(
        &self,
        run_id: &str,
        query: &str,
        run: &mut RunState<'_>,
    ) -> Result<CompletedRun, ResearchError> {
        run.advance(RunStage::Planning);
        let plan = self.plan_searches(query, run.progress).await?;

        run.advance(RunStage::Searching);
        let findings = self.perform_searches(&plan, run.progress).await;

        run.advance(RunStage::Writing);
        let report = self.write_report(query, &findings, run.progress).await?;

        run.advance(RunStage::Persisting);
        let generated_at = Local::now().naive_local();
        let saved_path = self.store.save(query, &report, &generated_at).await?;
        run.progress.emit(ProgressEvent::ReportSaved {
            path: saved_path.display().to_string(),
        });

        run.advance(RunStage::Done);
        Ok(CompletedRun {
            run_id: run_id.to_string(),
            query: query.to_string(),
            report,
            saved_path,
            searches: plan.len(),
            findings: findings.len(),
        })
    }

    /// Ask the planner for a search plan
    async fn plan_searches(
        &self,
        query: &str,
        progress: &Progress,
    ) -> Result<SearchPlan, ResearchError> {
        progress.emit(ProgressEvent::PlanningStarted);
        let start = Instant::now();

        let plan = self
            .planner
            .plan(query)
            .await
            .map_err(ResearchError::Planning)?;

        self.metrics.record_stage(TimedStage::Planning, start.elapsed());
        progress.emit(ProgressEvent::Planned {
            searches: plan.len(),
        });
        Ok(plan)
    }

    /// Execute every directive concurrently and keep the successes
    ///
    /// Waits for all searches to settle. Findings are collected in the order
    /// searches finish, not the order they were planned.
    async fn perform_searches(&self, plan: &SearchPlan, progress: &Progress) -> Vec<SearchFinding> {
        progress.emit(ProgressEvent::SearchingStarted {
            searches: plan.len(),
        });
        let start = Instant::now();

        let mut pending: FuturesUnordered<_> = plan
            .searches
            .iter()
            .map(|directive| self.search(directive, progress))
            .collect();

        let mut findings = Vec::with_capacity(plan.len());
        while let Some(outcome) = pending.next().await {
            if let Some(finding) = outcome {
                findings.push(finding);
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record_stage(TimedStage::Searching, elapsed);
        progress.emit(ProgressEvent::SearchesCompleted {
            succeeded: findings.len(),
            total: plan.len(),
            elapsed_ms: elapsed.as_millis() as u64,
        });
        findings
    }

    /// Perform a single search, swallowing any failure
    async fn search(&self, directive: &SearchDirective, progress: &Progress) -> Option<SearchFinding> {
        let result = match self.search_timeout {
            Some(limit) => match timeout(limit, self.searcher.search(directive)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("timed out after {:?}", limit)),
            },
            None => self.searcher.search(directive).await,
        };

        match result {
            Ok(finding) => {
                self.metrics.record_search(true);
                progress.emit(ProgressEvent::SearchSucceeded {
                    query: directive.query.clone(),
                });
                Some(finding)
            }
            Err(e) => {
                self.metrics.record_search(false);
                progress.emit(ProgressEvent::SearchFailed {
                    query: directive.query.clone(),
                    error: format!("{:#}", e),
                });
                None
            }
        }
    }

    /// Synthesize the findings into a report
    async fn write_report(
        &self,
        query: &str,
        findings: &[SearchFinding],
        progress: &Progress,
    ) -> Result<ReportDocument, ResearchError> {
        progress.emit(ProgressEvent::WritingStarted {
            findings: findings.len(),
        });
        let start = Instant::now();

        let report = self
            .writer
            .write(query, findings)
            .await
            .map_err(ResearchError::Writing)?;

        self.metrics.record_stage(TimedStage::Writing, start.elapsed());
        progress.emit(ProgressEvent::ReportWritten {
            chars: report.markdown_report.chars().count(),
        });
        Ok(report)
    }
}

/// Stage bookkeeping for one run
struct RunState<'a> {
    stage: RunStage,
    progress: &'a Progress,
}

impl<'a> RunState<'a> {
    fn new(progress: &'a Progress) -> Self {
        Self {
            stage: RunStage::Idle,
            progress,
        }
    }

    fn advance(&mut self, next: RunStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal run transition {} -> {}",
            self.stage,
            next
        );
        debug!("Run stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}
