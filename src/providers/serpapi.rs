//! SerpAPI provider (Google/Bing results through one aggregator API).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SafeSearch, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "serpapi";

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpAPI provider.
///
/// The backing engine defaults to `google`; `bing` is also understood.
pub struct SerpApi {
    api_key: String,
    engine: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl SerpApi {
    /// Creates a provider for the given API key.
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: require(api_key, "SerpAPI key")?,
            engine: "google".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: own_transport()?,
        })
    }

    /// Selects the SerpAPI engine (e.g. `google`, `bing`).
    pub fn with_engine(mut self, engine: &str) -> Self {
        self.engine = engine.trim().to_lowercase();
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

    fn is_bing(&self) -> bool {
        self.engine == "bing"
    }

    fn build_request(&self, request: &SearchRequest) -> Result<HttpRequest> {
        let query = require_query(request, NAME)?;
        let engine = match (request.kind, self.is_bing()) {
            (SearchKind::Images, true) => "bing_images",
            (SearchKind::News, true) => "bing_news",
            (SearchKind::Images, false) => "google_images",
            _ => self.engine.as_str(),
        };

        let mut params: Vec<(&str, String)> = vec![
            ("engine", engine.to_string()),
            ("q", query.to_string()),
            ("api_key", self.api_key.clone()),
            ("output", "json".to_string()),
        ];

        if self.is_bing() {
            params.push(("count", request.max_results.to_string()));
            params.push(("first", request.offset().saturating_add(1).to_string()));
            if let Some(region) = &request.region {
                params.push(("cc", region.clone()));
            }
            if let Some(language) = &request.language {
                params.push(("setlang", language.clone()));
            }
            params.push((
                "safeSearch",
                match request.safe_search {
                    SafeSearch::Off => "off",
                    SafeSearch::Moderate => "moderate",
                    SafeSearch::Strict => "strict",
                }
                .to_string(),
            ));
        } else {
            params.push(("num", request.max_results.to_string()));
            params.push(("start", request.offset().to_string()));
            if let Some(language) = &request.language {
                params.push(("hl", language.clone()));
            }
            if let Some(region) = &request.region {
                params.push(("gl", region.clone()));
            }
            if request.safe_search != SafeSearch::Off {
                params.push(("safe", "active".to_string()));
            }
            if request.kind == SearchKind::News {
                params.push(("tbm", "nws".to_string()));
            }
        }

        let url = url::Url::parse_with_params(&format!("{}/search.json", self.base_url), &params)?;
        Ok(HttpRequest::get(url.to_string(), request.timeout))
    }
}

#[async_trait]
impl Provider for SerpApi {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        let mut results = parse_results(&response.json()?, request.kind)?;
        results.truncate(request.max_results as usize);
        Ok(results)
    }

    fn troubleshooting_hint(&self) -> Option<&str> {
        Some("Check the SerpAPI key and the remaining search credits on the SerpAPI dashboard")
    }
}

fn parse_results(body: &Value, kind: SearchKind) -> Result<Vec<SearchResult>> {
    // SerpAPI reports some failures with a 200 and an "error" field.
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        if !error.contains("hasn't returned any results") {
            return Err(SearchError::Transport {
                status: None,
                message: format!("SerpAPI error: {}", error),
                body: Some(body.to_string()),
            });
        }
    }

    let key = match kind {
        SearchKind::Images => "images_results",
        SearchKind::News => "news_results",
        SearchKind::Text => "organic_results",
    };
    let items = match body.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SearchError::parse(format!("SerpAPI '{}' is not an array", key))),
        None => return Ok(Vec::new()),
    };

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let url = item
            .get("link")
            .or_else(|| item.get("original"))
            .or_else(|| item.get("url"))
            .and_then(Value::as_str);
        let title = item.get("title").and_then(Value::as_str);
        let (Some(url), Some(title)) = (url, title) else {
            continue;
        };

        let mut result = SearchResult::new(url, title, NAME);
        if let Some(snippet) = item.get("snippet").and_then(Value::as_str) {
            result = result.with_snippet(snippet);
        }
        if let Some(date) = item.get("date").and_then(Value::as_str) {
            result = result.with_published_date(date);
        }
        results.push(result.with_raw(item.clone()));
    }
    Ok(results)
}
