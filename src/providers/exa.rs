//! Exa neural search provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "exa";

const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Characters of page text requested as the snippet.
const SNIPPET_CHARS: u32 = 500;

/// Exa search provider.
pub struct Exa {
    api_key: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Exa {
    /// Creates a provider for the given API key.
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: require(api_key, "Exa API key")?,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: own_transport()?,
        })
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
        let mut body = json!({
            "query": query,
            "numResults": request.max_results,
            "type": "auto",
            "contents": { "text": { "maxCharacters": SNIPPET_CHARS } },
        });
        if request.kind == SearchKind::News {
            body["category"] = json!("news");
        }

        Ok(
            HttpRequest::post(format!("{}/search", self.base_url), body, request.timeout)
                .header("x-api-key", self.api_key.clone()),
        )
    }
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaItem {
    url: String,
    title: Option<String>,
    text: Option<String>,
    summary: Option<String>,
    published_date: Option<String>,
}

#[async_trait]
impl Provider for Exa {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        let mut results = parse_results(response.json()?)?;
        results.truncate(request.max_results as usize);
        Ok(results)
    }
}

fn parse_results(response: ExaResponse) -> Result<Vec<SearchResult>> {
    let mut results = Vec::with_capacity(response.results.len());
    for raw in response.results {
        let item: ExaItem = serde_json::from_value(raw.clone())
            .map_err(|e| SearchError::parse(format!("unexpected Exa result: {}", e)))?;

        let title = item
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| item.url.clone());
        let mut result = SearchResult::new(item.url, title, NAME);
        if let Some(snippet) = item.summary.or(item.text) {
            result = result.with_snippet(snippet);
        }
        if let Some(date) = item.published_date {
            result = result.with_published_date(date);
        }
        results.push(result.with_raw(raw));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;

    #[test]
    fn test_exa_requires_key() {
        assert!(Exa::new("").is_err());
    }

    #[test]
    fn test_build_request_body() {
        let exa = Exa::new("secret").unwrap().with_base_url("http://localhost:1234/");
        let http = exa
            .build_request(&SearchRequest::new("rust async").with_max_results(3))
            .unwrap();
        assert_eq!(http.method, Method::Post);
        assert_eq!(http.url, "http://localhost:1234/search");
        let body = http.body.unwrap();
        assert_eq!(body["query"], "rust async");
        assert_eq!(body["numResults"], 3);
        assert!(body.get("category").is_none());
        assert!(http.headers.contains(&("x-api-key".to_string(), "secret".to_string())));
    }

    #[test]
    fn test_build_request_news_category() {
        let exa = Exa::new("k").unwrap();
        let http = exa
            .build_request(&SearchRequest::new("q").with_kind(SearchKind::News))
            .unwrap();
        assert_eq!(http.body.unwrap()["category"], "news");
    }

    #[test]
    fn test_parse_results() {
        let response: ExaResponse = serde_json::from_value(json!({
            "results": [
                {"url": "https://tokio.rs", "title": "Tokio", "text": "An async runtime", "publishedDate": "2023-11-02"},
                {"url": "https://untitled.dev", "title": null}
            ]
        }))
        .unwrap();
        let results = parse_results(response).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet.as_deref(), Some("An async runtime"));
        assert_eq!(results[0].published_date.as_deref(), Some("2023-11-02"));
        assert_eq!(results[1].title, "https://untitled.dev");
    }

    #[test]
    fn test_parse_results_missing_url() {
        let response: ExaResponse =
            serde_json::from_value(json!({"results": [{"title": "x"}]})).unwrap();
        assert!(parse_results(response).is_err());
    }
}
