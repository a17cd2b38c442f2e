//! Engine traits and types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One organic result scraped from a search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    /// Description text shown under the link, if any
    pub snippet: Option<String>,
}

impl WebHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// HTTP request to be made on behalf of an engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    /// Query string parameters
    pub params: HashMap<String, String>,
    /// Form-encoded POST body
    pub form: Option<HashMap<String, String>>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            form: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set form data
    pub fn form(mut self, data: HashMap<String, String>) -> Self {
        self.form = Some(data);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP response handed back to an engine for parsing
#[derive(Debug)]
pub struct EngineResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub text: String,
    /// Final URL after redirects
    pub url: String,
}

impl EngineResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the engine served a bot challenge instead of results
    pub fn is_captcha(&self) -> bool {
        self.text.contains("captcha")
            || self.text.contains("CAPTCHA")
            || self.text.contains("anomaly-modal")
            || self.text.contains("unusual traffic")
    }
}

/// A scrapeable web search engine
///
/// Engines only build requests and parse responses; the shared HTTP client
/// performs the I/O.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Build the HTTP request for a search
    fn request(&self, query: &str) -> anyhow::Result<EngineRequest>;

    /// Parse the HTTP response into hits, best first
    fn response(&self, response: EngineResponse) -> anyhow::Result<Vec<WebHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = EngineRequest::get("https://example.com/search")
            .param("q", "rust")
            .header("Referer", "https://example.com/");

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.params.get("q").map(String::as_str), Some("rust"));
        assert!(request.form.is_none());
    }

    #[test]
    fn test_response_flags() {
        let response = EngineResponse {
            status: 202,
            headers: HashMap::new(),
            text: "<div class=\"anomaly-modal\"></div>".to_string(),
            url: String::new(),
        };
        assert!(response.is_success());
        assert!(response.is_captcha());
    }
}
