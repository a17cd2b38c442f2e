//! DuckDuckGo HTML search engine

use super::traits::*;
use anyhow::Result;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashMap;

/// DuckDuckGo's no-JavaScript results page
pub struct DuckDuckGo {
    html_url: String,
    region: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self::with_url("https://html.duckduckgo.com/html/")
    }

    /// Point the engine at a different endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            html_url: url.into(),
            region: "wt-wt".to_string(),
        }
    }

    fn parse_html_results(&self, html: &str) -> Result<Vec<WebHit>> {
        let document = Html::parse_document(html);
        let result_selector = selector("div.result")?;
        let title_selector = selector("a.result__a")?;
        let snippet_selector = selector(".result__snippet")?;

        let mut hits = Vec::new();
        for element in document.select(&result_selector) {
            // Sponsored slots carry the ad class and link back through DuckDuckGo
            if element.value().classes().any(|c| c == "result--ad") {
                continue;
            }

            let Some(title_elem) = element.select(&title_selector).next() else {
                continue;
            };

            let title = normalize_whitespace(&title_elem.text().collect::<String>());
            let Some(url) = title_elem.value().attr("href").and_then(result_url) else {
                continue;
            };
            if title.is_empty() {
                continue;
            }

            let mut hit = WebHit::new(title, url);
            if let Some(snippet) = element.select(&snippet_selector).next() {
                let text = normalize_whitespace(&snippet.text().collect::<String>());
                if !text.is_empty() {
                    hit = hit.with_snippet(text);
                }
            }
            hits.push(hit);
        }

        Ok(hits)
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn request(&self, query: &str) -> Result<EngineRequest> {
        let mut form_data = HashMap::new();
        form_data.insert("q".to_string(), query.to_string());
        form_data.insert("b".to_string(), String::new());
        form_data.insert("kl".to_string(), self.region.clone());

        Ok(EngineRequest::post(&self.html_url)
            .header("Referer", "https://html.duckduckgo.com/")
            .form(form_data))
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<WebHit>> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }
        if response.is_captcha() {
            return Err(anyhow::anyhow!("CAPTCHA challenge from {}", self.name()));
        }

        self.parse_html_results(&response.text)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {}: {:?}", css, e))
}

/// Resolve a result href to the destination page
///
/// Redirect links (`//duckduckgo.com/l/?uddg=...`) are unwrapped; ad clicks
/// and anything that does not land on an http(s) page are dropped.
fn result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    let url = match url.host_str() {
        Some(host) if host == "duckduckgo.com" || host.ends_with(".duckduckgo.com") => {
            if url.path() != "/l/" {
                return None;
            }
            let target = url
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())?;
            Url::parse(&target).ok()?
        }
        _ => url,
    };

    match url.scheme() {
        "http" | "https" => Some(url.into()),
        _ => None,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
