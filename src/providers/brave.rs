//! Brave Search API provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{own_transport, require, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SafeSearch, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "brave";

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Brave caps `count` at 20 for web search.
const MAX_PAGE_SIZE: u32 = 20;

/// Brave Search provider.
pub struct Brave {
    api_key: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Brave {
    /// Creates a provider for the given subscription token.
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self {
            api_key: require(api_key, "Brave API key")?,
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
        let endpoint = match request.kind {
            SearchKind::Text => "web",
            SearchKind::Images => "images",
            SearchKind::News => "news",
        };

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("count", request.max_results.clamp(1, MAX_PAGE_SIZE).to_string()),
            (
                "safesearch",
                match request.safe_search {
                    SafeSearch::Off => "off",
                    SafeSearch::Moderate => "moderate",
                    SafeSearch::Strict => "strict",
                }
                .to_string(),
            ),
        ];
        // Brave pages by page index, not by result offset.
        if request.kind != SearchKind::Images {
            params.push(("offset", request.page.saturating_sub(1).to_string()));
        }
        if let Some(language) = &request.language {
            params.push(("search_lang", language.clone()));
        }
        if let Some(region) = &request.region {
            params.push(("country", region.clone()));
        }

        let url = url::Url::parse_with_params(
            &format!("{}/res/v1/{}/search", self.base_url, endpoint),
            &params,
        )?;
        Ok(HttpRequest::get(url.to_string(), request.timeout)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", self.api_key.clone()))
    }
}

#[async_trait]
impl Provider for Brave {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        let mut results = parse_results(&response.json()?, request.kind)?;
        // The wire page size never goes below one, so zero is enforced here.
        results.truncate(request.max_results as usize);
        Ok(results)
    }
}

fn parse_results(body: &Value, kind: SearchKind) -> Result<Vec<SearchResult>> {
    let items = match kind {
        SearchKind::Text => body.pointer("/web/results"),
        SearchKind::Images | SearchKind::News => body.get("results"),
    };
    let items = match items {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SearchError::parse("Brave results are not an array")),
        None => return Ok(Vec::new()),
    };

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let (Some(url), Some(title)) = (
            item.get("url").and_then(Value::as_str),
            item.get("title").and_then(Value::as_str),
        ) else {
            continue;
        };

        let mut result = SearchResult::new(url, title, NAME);
        if let Some(description) = item.get("description").and_then(Value::as_str) {
            result = result.with_snippet(strip_markup(description));
        }
        if let Some(hostname) = item.pointer("/meta_url/hostname").and_then(Value::as_str) {
            result = result.with_domain(hostname.trim_start_matches("www."));
        }
        if let Some(age) = item
            .get("page_age")
            .or_else(|| item.get("age"))
            .and_then(Value::as_str)
        {
            result = result.with_published_date(age);
        }
        results.push(result.with_raw(item.clone()));
    }
    Ok(results)
}

/// Brave highlights matches with `<strong>` tags in descriptions.
fn strip_markup(text: &str) -> String {
    regex::Regex::new(r"</?[a-zA-Z][^>]*>")
        .map(|re| re.replace_all(text, "").into_owned())
        .unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_brave_requires_key() {
        assert!(Brave::new(" ").is_err());
    }

    #[test]
    fn test_brave_has_no_static_hint() {
        let brave = Brave::new("token").unwrap();
        assert_eq!(brave.name(), "brave");
        assert!(brave.troubleshooting_hint().is_none());
    }

    #[test]
    fn test_build_request_headers_and_params() {
        let brave = Brave::new("token").unwrap();
        let request = SearchRequest::new("rust")
            .with_max_results(50)
            .with_page(2)
            .with_region("de");
        let http = brave.build_request(&request).unwrap();
        assert!(http.url.contains("/res/v1/web/search?"));
        assert!(http.url.contains("count=20"));
        assert!(http.url.contains("offset=1"));
        assert!(http.url.contains("country=de"));
        assert!(http
            .headers
            .contains(&("X-Subscription-Token".to_string(), "token".to_string())));
    }

    #[test]
    fn test_build_request_news_endpoint() {
        let brave = Brave::new("token").unwrap();
        let http = brave
            .build_request(&SearchRequest::new("q").with_kind(SearchKind::News))
            .unwrap();
        assert!(http.url.contains("/res/v1/news/search?"));
    }

    #[test]
    fn test_parse_web_results() {
        let body = json!({
            "web": {"results": [
                {
                    "title": "Rust",
                    "url": "https://www.rust-lang.org/",
                    "description": "A <strong>language</strong> for everyone",
                    "page_age": "2024-01-01T00:00:00",
                    "meta_url": {"hostname": "www.rust-lang.org"}
                },
                {"title": "no url"}
            ]}
        });
        let results = parse_results(&body, SearchKind::Text).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet.as_deref(), Some("A language for everyone"));
        assert_eq!(results[0].domain.as_deref(), Some("rust-lang.org"));
        assert_eq!(results[0].published_date.as_deref(), Some("2024-01-01T00:00:00"));
    }

    #[test]
    fn test_parse_news_results() {
        let body = json!({"results": [{"title": "Headline", "url": "https://news.example/a", "age": "2 hours ago"}]});
        let results = parse_results(&body, SearchKind::News).unwrap();
        assert_eq!(results[0].published_date.as_deref(), Some("2 hours ago"));
    }

    #[test]
    fn test_parse_missing_web_section() {
        let body = json!({"query": {"original": "x"}});
        assert!(parse_results(&body, SearchKind::Text).unwrap().is_empty());
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<strong>a</strong> &amp; b"), "a &amp; b");
    }
}
