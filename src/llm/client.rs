//! HTTP client for chat completions and the responses API

use super::types::*;
use super::{LlmError, Result};
use crate::config::LlmSettings;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Client for an OpenAI-compatible endpoint
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(http: Client, settings: &LlmSettings) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(settings.request_timeout).map_err(|e| {
            LlmError::InvalidSettings(format!(
                "request_timeout {}: {}",
                settings.request_timeout, e
            ))
        })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timeout,
        })
    }

    /// Whether requests will carry credentials
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Plain chat completion, returns the assistant text
    pub async fn complete(&self, model: &str, instructions: &str, input: &str) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::system(instructions), ChatMessage::user(input)],
            response_format: None,
        };
        let response: ChatResponse = self.post("chat/completions", &request).await?;
        first_content(response)
    }

    /// Chat completion constrained to a JSON schema, deserialized into `T`
    pub async fn structured<T: DeserializeOwned>(
        &self,
        model: &str,
        instructions: &str,
        input: &str,
        schema: &OutputSchema,
    ) -> Result<T> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::system(instructions), ChatMessage::user(input)],
            response_format: Some(ResponseFormat::from(schema)),
        };
        let response: ChatResponse = self.post("chat/completions", &request).await?;
        let content = first_content(response)?;

        serde_json::from_str(&content)
            .map_err(|e| LlmError::Parse(format!("{} output: {}", schema.name, e)))
    }

    /// Responses API call with the hosted web search tool forced on
    pub async fn web_search(
        &self,
        model: &str,
        instructions: &str,
        input: &str,
        context_size: &str,
    ) -> Result<String> {
        let request = ResponsesRequest {
            model: model.to_string(),
            instructions: instructions.to_string(),
            input: input.to_string(),
            tools: vec![HostedTool::web_search(context_size)],
            tool_choice: "required",
        };
        let response: ResponsesResponse = self.post("responses", &request).await?;

        let text = response.output_text();
        if text.trim().is_empty() {
            return Err(LlmError::Parse("response contained no output text".to_string()));
        }
        Ok(text)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("POST {}", url);

        let mut builder = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(body);

        match &self.api_key {
            Some(key) => builder = builder.bearer_auth(key),
            // Local OpenAI-compatible servers usually run without credentials
            None if self.base_url.contains("api.openai.com") => {
                return Err(LlmError::MissingApiKey)
            }
            None => {}
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication(text),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
                _ => LlmError::Api {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Err(LlmError::Parse(format!("model refused: {}", refusal)));
    }
    message
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LlmError::Parse("Empty content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair {
        a: String,
        b: u32,
    }

    fn client(server: &MockServer, key: Option<&str>) -> LlmClient {
        let settings = LlmSettings {
            base_url: format!("{}/v1/", server.uri()),
            api_key: key.map(str::to_string),
            ..LlmSettings::default()
        };
        LlmClient::new(Client::new(), &settings).unwrap()
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn test_structured_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": {"type": "json_schema", "json_schema": {"name": "pair"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(r#"{"a":"x","b":2}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let schema = OutputSchema::new("pair", json!({"type": "object"}));
        let pair: Pair = client(&server, Some("sk-test"))
            .structured("gpt-4o-mini", "be terse", "go", &schema)
            .await
            .unwrap();

        assert_eq!(pair, Pair { a: "x".to_string(), b: 2 });
    }

    #[tokio::test]
    async fn test_structured_output_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("not json")))
            .mount(&server)
            .await;

        let schema = OutputSchema::new("pair", json!({}));
        let err = client(&server, None)
            .structured::<Pair>("m", "i", "q", &schema)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "unauthorized"})))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "limited"})))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "broken"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server, Some("sk-test"));
        assert!(matches!(
            client.complete("unauthorized", "i", "q").await,
            Err(LlmError::Authentication(body)) if body == "bad key"
        ));
        assert!(matches!(
            client.complete("limited", "i", "q").await,
            Err(LlmError::RateLimited)
        ));
        assert!(matches!(
            client.complete("broken", "i", "q").await,
            Err(LlmError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_web_search_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(body_partial_json(json!({
                "input": "Search term: rust",
                "tool_choice": "required",
                "tools": [{"type": "web_search_preview", "search_context_size": "low"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [
                    {"type": "web_search_call", "status": "completed"},
                    {"type": "message", "content": [{"type": "output_text", "text": "summary"}]}
                ]
            })))
            .mount(&server)
            .await;

        let text = client(&server, None)
            .web_search("gpt-4o-mini", "search", "Search term: rust", "low")
            .await
            .unwrap();
        assert_eq!(text, "summary");
    }

    #[tokio::test]
    async fn test_missing_key_for_hosted_api() {
        let settings = LlmSettings::default();
        let client = LlmClient::new(Client::new(), &settings).unwrap();

        assert!(!client.has_api_key());
        assert!(matches!(
            client.complete("m", "i", "q").await,
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for timeout in [-1.0, f64::NAN, f64::INFINITY] {
            let settings = LlmSettings {
                request_timeout: timeout,
                ..LlmSettings::default()
            };
            assert!(matches!(
                LlmClient::new(Client::new(), &settings),
                Err(LlmError::InvalidSettings(_))
            ));
        }
    }
}
