//! LLM-backed report writer

use super::prompts::{report_schema, writer_input, WRITER_INSTRUCTIONS};
use crate::llm::LlmClient;
use crate::research::{ReportDocument, SearchFinding, Writes};
use anyhow::Result;
use async_trait::async_trait;

pub struct LlmWriter {
    llm: LlmClient,
    model: String,
}

impl LlmWriter {
    pub fn new(llm: LlmClient, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Writes for LlmWriter {
    async fn write(&self, query: &str, findings: &[SearchFinding]) -> Result<ReportDocument> {
        let report = self
            .llm
            .structured(
                &self.model,
                WRITER_INSTRUCTIONS,
                &writer_input(query, findings),
                &report_schema(),
            )
            .await?;
        Ok(report)
    }
}
