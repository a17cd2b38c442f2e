//! Search providers

use super::prompts::{hits_input, search_input, SEARCH_INSTRUCTIONS, SUMMARIZE_INSTRUCTIONS};
use crate::engines::Engine;
use crate::llm::LlmClient;
use crate::network::HttpClient;
use crate::research::{SearchDirective, SearchFinding, Searches};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Provider-hosted web search, summarized by the same call
pub struct HostedSearcher {
    llm: LlmClient,
    model: String,
    context_size: String,
}

impl HostedSearcher {
    pub fn new(llm: LlmClient, model: impl Into<String>, context_size: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            context_size: context_size.into(),
        }
    }
}

#[async_trait]
impl Searches for HostedSearcher {
    async fn search(&self, directive: &SearchDirective) -> Result<SearchFinding> {
        let summary = self
            .llm
            .web_search(
                &self.model,
                SEARCH_INSTRUCTIONS,
                &search_input(directive),
                &self.context_size,
            )
            .await?;
        Ok(summary)
    }
}

/// Scrapes a web engine, then has the search model summarize the hits
pub struct EngineSearcher {
    http: HttpClient,
    engine: Arc<dyn Engine>,
    llm: LlmClient,
    model: String,
    max_hits: usize,
}

impl EngineSearcher {
    pub fn new(
        http: HttpClient,
        engine: Arc<dyn Engine>,
        llm: LlmClient,
        model: impl Into<String>,
        max_hits: usize,
    ) -> Self {
        Self {
            http,
            engine,
            llm,
            model: model.into(),
            max_hits,
        }
    }
}

#[async_trait]
impl Searches for EngineSearcher {
    async fn search(&self, directive: &SearchDirective) -> Result<SearchFinding> {
        let request = self.engine.request(&directive.query)?;
        let response = self.http.execute(request).await?;
        let mut hits = self.engine.response(response)?;

        if hits.is_empty() {
            bail!("{} returned no results for {}", self.engine.name(), directive.query);
        }
        hits.truncate(self.max_hits);
        debug!(
            "{} returned {} hits for {}",
            self.engine.name(),
            hits.len(),
            directive.query
        );

        let summary = self
            .llm
            .complete(&self.model, SUMMARIZE_INSTRUCTIONS, &hits_input(directive, &hits))
            .await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::engines::DuckDuckGo;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm(server: &MockServer) -> LlmClient {
        let settings = LlmSettings {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        };
        LlmClient::new(reqwest::Client::new(), &settings).unwrap()
    }

    fn results_page(count: usize) -> String {
        let mut html = String::from("<html><body>");
        for i in 0..count {
            html.push_str(&format!(
                "<div class=\"result\"><a class=\"result__a\" href=\"https://site{i}.example/\">Hit {i}</a>\
                 <a class=\"result__snippet\">snippet {i}</a></div>"
            ));
        }
        html.push_str("</body></html>");
        html
    }

    #[tokio::test]
    async fn test_hosted_search() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(body_string_contains("Search term: rust async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [{"type": "message", "content": [
                    {"type": "output_text", "text": "Tokio dominates."}
                ]}]
            })))
            .mount(&server)
            .await;

        let searcher = HostedSearcher::new(llm(&server), "gpt-4o-mini", "low");
        let finding = searcher
            .search(&SearchDirective::new("rust async", "runtime landscape"))
            .await
            .unwrap();
        assert_eq!(finding, "Tokio dominates.");
    }

    #[tokio::test]
    async fn test_engine_search_caps_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(results_page(5)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Hit 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "two sites agree"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let engine = Arc::new(DuckDuckGo::with_url(format!("{}/html/", server.uri())));
        let searcher = EngineSearcher::new(
            HttpClient::new().unwrap(),
            engine,
            llm(&server),
            "gpt-4o-mini",
            2,
        );
        let finding = searcher
            .search(&SearchDirective::new("rust", "r"))
            .await
            .unwrap();
        assert_eq!(finding, "two sites agree");

        let requests = server.received_requests().await.unwrap();
        let summary_body = requests
            .iter()
            .find(|r| r.url.path() == "/chat/completions")
            .map(|r| String::from_utf8_lossy(&r.body).to_string())
            .unwrap();
        assert!(!summary_body.contains("Hit 2"));
    }

    #[tokio::test]
    async fn test_engine_search_without_hits_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(results_page(0)))
            .mount(&server)
            .await;

        let engine = Arc::new(DuckDuckGo::with_url(format!("{}/html/", server.uri())));
        let searcher =
            EngineSearcher::new(HttpClient::new().unwrap(), engine, llm(&server), "m", 8);
        let err = searcher
            .search(&SearchDirective::new("nothing", "r"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no results"));
    }
}
