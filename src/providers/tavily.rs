//! Tavily search provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "tavily";

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily accepts at most 20 results per call.
const MAX_PAGE_SIZE: u32 = 20;

/// Tavily search provider.
pub struct Tavily {
    api_key: String,
    search_depth: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Tavily {
    /// Creates a provider for the given API key.
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: require(api_key, "Tavily API key")?,
            search_depth: "basic".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: own_transport()?,
        })
    }

    /// Uses the slower `advanced` search depth.
    pub fn advanced(mut self) -> Self {
        self.search_depth = "advanced".to_string();
        self
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    fn build_request(&self, request: &SearchRequest) -> Result<HttpRequest> {
        let query = require_query(request, NAME)?;
        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": request.max_results.clamp(1, MAX_PAGE_SIZE),
            "search_depth": self.search_depth,
            "topic": if request.kind == SearchKind::News { "news" } else { "general" },
        });
        Ok(HttpRequest::post(
            format!("{}/search", self.base_url),
            body,
            request.timeout,
        ))
    }
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
struct TavilyItem {
    url: String,
    title: String,
    content: Option<String>,
    published_date: Option<String>,
}

#[async_trait]
impl Provider for Tavily {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        let mut results = parse_results(response.json()?)?;
        // The wire page size never goes below one, so zero is enforced here.
        results.truncate(request.max_results as usize);
        Ok(results)
    }
}

fn parse_results(response: TavilyResponse) -> Result<Vec<SearchResult>> {
    response
        .results
        .into_iter()
        .map(|raw| {
            let item: TavilyItem = serde_json::from_value(raw.clone())
                .map_err(|e| SearchError::parse(format!("unexpected Tavily result: {}", e)))?;
            let mut result = SearchResult::new(item.url, item.title, NAME)
                .with_snippet(item.content.unwrap_or_default());
            if let Some(date) = item.published_date {
                result = result.with_published_date(date);
            }
            Ok(result.with_raw(raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tavily_requires_key() {
        assert!(Tavily::new("").is_err());
    }

    #[test]
    fn test_build_request_body() {
        let tavily = Tavily::new("tvly-key").unwrap();
        let http = tavily
            .build_request(&SearchRequest::new("rust").with_max_results(50))
            .unwrap();
        let body = http.body.unwrap();
        assert_eq!(body["api_key"], "tvly-key");
        assert_eq!(body["max_results"], 20);
        assert_eq!(body["topic"], "general");
        assert_eq!(body["search_depth"], "basic");
        assert_eq!(http.url, "https://api.tavily.com/search");
    }

    #[test]
    fn test_build_request_news_advanced() {
        let tavily = Tavily::new("k").unwrap().advanced();
        let http = tavily
            .build_request(&SearchRequest::new("q").with_kind(SearchKind::News))
            .unwrap();
        let body = http.body.unwrap();
        assert_eq!(body["topic"], "news");
        assert_eq!(body["search_depth"], "advanced");
    }

    #[test]
    fn test_parse_results() {
        let response: TavilyResponse = serde_json::from_value(json!({
            "query": "rust",
            "results": [
                {"title": "Rust", "url": "https://rust-lang.org", "content": "Rust is fast", "score": 0.9},
                {"title": "News", "url": "https://news.example/r", "published_date": "Mon, 01 Jan 2024 10:00:00 GMT"}
            ]
        }))
        .unwrap();
        let results = parse_results(response).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet.as_deref(), Some("Rust is fast"));
        assert_eq!(results[0].raw.as_ref().unwrap()["score"], 0.9);
        assert_eq!(
            results[1].published_date.as_deref(),
            Some("Mon, 01 Jan 2024 10:00:00 GMT")
        );
    }
}
