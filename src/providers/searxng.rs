//! Self-hosted SearXNG provider using the JSON output format.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SafeSearch, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "searxng";

/// SearXNG metasearch provider.
pub struct SearxNG {
    base_url: String,
    engines: Option<String>,
    transport: Arc<dyn Transport>,
}

impl SearxNG {
    /// Creates a provider for the instance at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = require(base_url, "SearXNG instance URL")?;
        url::Url::parse(&base_url)?;
        Ok(Self {
            base_url: trim_base(&base_url),
            engines: None,
            transport: own_transport()?,
        })
    }

    /// Restricts the instance to a comma-separated engine list.
    pub fn with_engines(mut self, engines: &str) -> Self {
        self.engines = Some(engines.to_string());
        self
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    fn build_request(&self, request: &SearchRequest) -> Result<HttpRequest> {
        let query = require_query(request, NAME)?;
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("pageno", request.page.to_string()),
            (
                "categories",
                match request.kind {
                    SearchKind::Text => "general",
                    SearchKind::Images => "images",
                    SearchKind::News => "news",
                }
                .to_string(),
            ),
            (
                "safesearch",
                match request.safe_search {
                    SafeSearch::Off => "0",
                    SafeSearch::Moderate => "1",
                    SafeSearch::Strict => "2",
                }
                .to_string(),
            ),
        ];
        if let Some(language) = &request.language {
            params.push(("language", language.clone()));
        }
        if let Some(engines) = &self.engines {
            params.push(("engines", engines.clone()));
        }

        let url = url::Url::parse_with_params(&format!("{}/search", self.base_url), &params)?;
        Ok(HttpRequest::get(url.to_string(), request.timeout).header("Accept", "application/json"))
    }
}

#[derive(Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearxItem {
    url: String,
    title: String,
    content: Option<String>,
    published_date: Option<String>,
}

#[async_trait]
impl Provider for SearxNG {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        let mut results = parse_results(response.json()?)?;
        // SearXNG has no page-size parameter.
        results.truncate(request.max_results as usize);
        Ok(results)
    }

    fn troubleshooting_hint(&self) -> Option<&str> {
        Some("Check the SearXNG instance URL and that the JSON output format is enabled in its settings.yml")
    }
}

fn parse_results(response: SearxResponse) -> Result<Vec<SearchResult>> {
    let mut results = Vec::with_capacity(response.results.len());
    for raw in response.results {
        let item: SearxItem = serde_json::from_value(raw.clone())
            .map_err(|e| SearchError::parse(format!("unexpected SearXNG result: {}", e)))?;
        let mut result = SearchResult::new(item.url, item.title, NAME)
            .with_snippet(item.content.unwrap_or_default());
        if let Some(date) = item.published_date {
            result = result.with_published_date(date);
        }
        results.push(result.with_raw(raw));
    }
    Ok(results)
}
