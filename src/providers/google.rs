//! Google Custom Search JSON API provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SafeSearch, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "google";

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// The Custom Search API caps `num` at 10.
const MAX_PAGE_SIZE: u32 = 10;

/// Google Custom Search provider.
pub struct Google {
    api_key: String,
    cx: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Google {
    /// Creates a provider for the given API key and search engine ID.
    pub fn new(api_key: &str, cx: &str) -> Result<Self> {
        Ok(Self {
            api_key: require(api_key, "Google API key")?,
            cx: require(cx, "Google search engine ID (cx)")?,
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
        let mut params: Vec<(&str, String)> = vec![
            ("key", self.api_key.clone()),
            ("cx", self.cx.clone()),
            ("q", query.to_string()),
            ("num", request.max_results.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("start", request.offset().saturating_add(1).to_string()),
            (
                "safe",
                match request.safe_search {
                    SafeSearch::Off => "off",
                    _ => "active",
                }
                .to_string(),
            ),
        ];
        if let Some(language) = &request.language {
            params.push(("lr", format!("lang_{}", language)));
            params.push(("hl", language.clone()));
        }
        if let Some(region) = &request.region {
            params.push(("gl", region.clone()));
        }
        if request.kind == SearchKind::Images {
            params.push(("searchType", "image".to_string()));
        }

        let url = url::Url::parse_with_params(&format!("{}/customsearch/v1", self.base_url), &params)?;
        Ok(HttpRequest::get(url.to_string(), request.timeout))
    }
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Deserialize)]
struct GoogleItem {
    title: String,
    link: String,
    snippet: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
}

#[async_trait]
impl Provider for Google {
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

    fn troubleshooting_hint(&self) -> Option<&str> {
        Some("Check the Google API key, the search engine ID (cx) and the daily query quota in the Google Cloud console")
    }
}

fn parse_results(response: GoogleResponse) -> Result<Vec<SearchResult>> {
    let mut results = Vec::with_capacity(response.items.len());
    for raw in response.items {
        let item: GoogleItem = serde_json::from_value(raw.clone())
            .map_err(|e| crate::SearchError::parse(format!("unexpected Google item: {}", e)))?;

        let mut result = SearchResult::new(item.link, item.title, NAME)
            .with_snippet(item.snippet.unwrap_or_default());
        if let Some(domain) = item.display_link {
            result = result.with_domain(domain.trim_start_matches("www.").to_string());
        }
        if let Some(date) = published_time(&raw) {
            result = result.with_published_date(date);
        }
        results.push(result.with_raw(raw));
    }
    Ok(results)
}

/// Reads `pagemap.metatags[0]["article:published_time"]`.
fn published_time(item: &Value) -> Option<String> {
    item.pointer("/pagemap/metatags/0/article:published_time")
        .and_then(Value::as_str)
        .map(str::to_string)
}
