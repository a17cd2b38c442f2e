//! LLM-backed search planner

use super::prompts::{plan_schema, planner_input, planner_instructions};
use crate::llm::LlmClient;
use crate::research::{Plans, SearchPlan};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Asks the planner model for a fixed number of search directives
pub struct LlmPlanner {
    llm: LlmClient,
    model: String,
    search_count: usize,
}

impl LlmPlanner {
    pub fn new(llm: LlmClient, model: impl Into<String>, search_count: usize) -> Self {
        Self {
            llm,
            model: model.into(),
            search_count,
        }
    }
}

#[async_trait]
impl Plans for LlmPlanner {
    async fn plan(&self, query: &str) -> Result<SearchPlan> {
        let mut plan: SearchPlan = self
            .llm
            .structured(
                &self.model,
                &planner_instructions(self.search_count),
                &planner_input(query),
                &plan_schema(),
            )
            .await?;

        if plan.len() > self.search_count {
            debug!(
                "Planner returned {} searches, keeping {}",
                plan.len(),
                self.search_count
            );
            plan.truncate(self.search_count);
        }
        Ok(plan)
    }
}
