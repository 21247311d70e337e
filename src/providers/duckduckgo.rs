//! DuckDuckGo provider (scraped HTML for web, token-gated JSON for images and news).

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{own_transport, require_query, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SafeSearch, SearchError, SearchKind, SearchRequest, SearchResult};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "duckduckgo";

const DEFAULT_BASE_URL: &str = "https://duckduckgo.com";
const DEFAULT_HTML_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo search provider.
///
/// Web results are scraped from the HTML endpoint. Image and news results
/// need a `vqd` token, fetched from the main page before the JSON call.
pub struct DuckDuckGo {
    base_url: String,
    html_url: String,
    transport: Arc<dyn Transport>,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo provider.
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            html_url: DEFAULT_HTML_URL.to_string(),
            transport: own_transport()?,
        })
    }

    /// Points both the main and HTML endpoints at `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self.html_url = self.base_url.clone();
        self
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    fn region(request: &SearchRequest) -> String {
        match (&request.region, &request.language) {
            (Some(region), Some(language)) => format!("{}-{}", region, language),
            (Some(region), None) => format!("{}-en", region),
            _ => "wt-wt".to_string(),
        }
    }

    async fn search_web(&self, request: &SearchRequest, query: &str) -> Result<Vec<SearchResult>> {
        let params = [
            ("q", query.to_string()),
            ("kl", Self::region(request)),
            ("s", request.offset().to_string()),
            ("kp", safe_param(request.safe_search).to_string()),
        ];
        let url = url::Url::parse_with_params(&format!("{}/html/", self.html_url), &params)?;
        let response = self
            .transport
            .execute(HttpRequest::get(url.to_string(), request.timeout), &request.debug)
            .await?;

        let mut results = parse_html(response.text())?;
        results.truncate(request.max_results as usize);
        Ok(results)
    }

    async fn fetch_token(&self, request: &SearchRequest, query: &str) -> Result<String> {
        let url = url::Url::parse_with_params(&format!("{}/", self.base_url), &[("q", query)])?;
        let response = self
            .transport
            .execute(HttpRequest::get(url.to_string(), request.timeout), &request.debug)
            .await?;
        extract_vqd(response.text())
            .ok_or_else(|| SearchError::parse("DuckDuckGo vqd token not found in page"))
    }

    async fn search_json(
        &self,
        request: &SearchRequest,
        query: &str,
        endpoint: &str,
    ) -> Result<Vec<SearchResult>> {
        let vqd = self.fetch_token(request, query).await?;
        let params = [
            ("q", query.to_string()),
            ("vqd", vqd),
            ("o", "json".to_string()),
            ("l", Self::region(request)),
            ("p", safe_param(request.safe_search).to_string()),
            ("s", request.offset().to_string()),
        ];
        let url = url::Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), &params)?;
        let response = self
            .transport
            .execute(
                HttpRequest::get(url.to_string(), request.timeout)
                    .header("Referer", format!("{}/", self.base_url)),
                &request.debug,
            )
            .await?;

        let mut results = parse_json(&response.json()?, request.kind)?;
        results.truncate(request.max_results as usize);
        Ok(results)
    }
}

#[async_trait]
impl Provider for DuckDuckGo {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let query = require_query(request, NAME)?;
        match request.kind {
            SearchKind::Text => self.search_web(request, query).await,
            SearchKind::Images => self.search_json(request, query, "i.js").await,
            SearchKind::News => self.search_json(request, query, "news.js").await,
        }
    }

    fn troubleshooting_hint(&self) -> Option<&str> {
        Some("DuckDuckGo results are scraped: the page layout may have changed or the client may be temporarily blocked")
    }
}

fn safe_param(level: SafeSearch) -> &'static str {
    match level {
        SafeSearch::Off => "-2",
        SafeSearch::Moderate => "-1",
        SafeSearch::Strict => "1",
    }
}

fn extract_vqd(page: &str) -> Option<String> {
    let re = Regex::new(r#"vqd=["']?([\d-]+)["']?"#).ok()?;
    re.captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_html(html: &str) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result:not(.result--ad)")
        .map_err(|e| SearchError::parse(format!("Failed to parse selector: {:?}", e)))?;
    let title_selector = Selector::parse(".result__title a")
        .map_err(|e| SearchError::parse(format!("Failed to parse selector: {:?}", e)))?;
    let snippet_selector = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::parse(format!("Failed to parse selector: {:?}", e)))?;

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let Some(title_elem) = element.select(&title_selector).next() else {
            continue;
        };
        let title = title_elem.text().collect::<String>().trim().to_string();
        let href = title_elem.value().attr("href").unwrap_or_default();
        let url = if href.contains("duckduckgo.com/l/") {
            extract_redirect_url(href).unwrap_or_else(|| href.to_string())
        } else {
            href.to_string()
        };

        if url.is_empty() || title.is_empty() {
            continue;
        }

        let snippet = element
            .select(&snippet_selector)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default();
        results.push(SearchResult::new(url, title, NAME).with_snippet(snippet));
    }

    Ok(results)
}

fn extract_redirect_url(url: &str) -> Option<String> {
    let start = url.find("uddg=")? + "uddg=".len();
    let encoded = &url[start..];
    let end = encoded.find('&').unwrap_or(encoded.len());
    let decoded = urlencoding::decode(&encoded[..end]).ok()?;
    Some(decoded.into_owned())
}

fn parse_json(body: &Value, kind: SearchKind) -> Result<Vec<SearchResult>> {
    let items = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::parse("DuckDuckGo response has no results array"))?;

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let (Some(url), Some(title)) = (
            item.get("url").and_then(Value::as_str),
            item.get("title").and_then(Value::as_str),
        ) else {
            continue;
        };

        let mut result = SearchResult::new(url, title, NAME);
        match kind {
            SearchKind::News => {
                if let Some(excerpt) = item.get("excerpt").and_then(Value::as_str) {
                    result = result.with_snippet(excerpt);
                }
                // News dates are unix seconds.
                if let Some(date) = item.get("date").and_then(Value::as_i64) {
                    result = result.with_published_date(date.to_string());
                }
            }
            _ => {
                if let Some(source) = item.get("source").and_then(Value::as_str) {
                    result = result.with_snippet(source);
                }
            }
        }
        results.push(result.with_raw(item.clone()));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duckduckgo_name() {
        let ddg = DuckDuckGo::new().unwrap();
        assert_eq!(ddg.name(), "duckduckgo");
        assert!(!ddg.supports_id_list());
        assert!(ddg.troubleshooting_hint().unwrap().contains("scraped"));
    }

    #[test]
    fn test_region_param() {
        let request = SearchRequest::new("q");
        assert_eq!(DuckDuckGo::region(&request), "wt-wt");
        let request = SearchRequest::new("q").with_region("us").with_language("en");
        assert_eq!(DuckDuckGo::region(&request), "us-en");
        let request = SearchRequest::new("q").with_region("de");
        assert_eq!(DuckDuckGo::region(&request), "de-en");
    }

    #[test]
    fn test_extract_vqd() {
        assert_eq!(
            extract_vqd(r#"<script>vqd="4-12345678901234567890"</script>"#).as_deref(),
            Some("4-12345678901234567890")
        );
        assert_eq!(extract_vqd("...&vqd=3-999&p=1").as_deref(), Some("3-999"));
        assert!(extract_vqd("<html></html>").is_none());
    }

    #[test]
    fn test_extract_redirect_url() {
        let url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(extract_redirect_url(url), Some("https://example.com/page".to_string()));
    }

    #[test]
    fn test_extract_redirect_url_no_params() {
        let url = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com";
        assert_eq!(extract_redirect_url(url), Some("https://example.com".to_string()));
    }

    #[test]
    fn test_parse_html_empty() {
        assert!(parse_html("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_html_results() {
        let html = r#"
            <html><body>
              <div class="result results_links web-result">
                <h2 class="result__title">
                  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&rut=x">Rust Programming Language</a>
                </h2>
                <a class="result__snippet">A language empowering everyone.</a>
              </div>
              <div class="result result--ad">
                <h2 class="result__title"><a href="https://ads.example">Ad</a></h2>
              </div>
              <div class="result">
                <h2 class="result__title"><a href="https://doc.rust-lang.org/book/">The Book</a></h2>
              </div>
            </body></html>
        "#;
        let results = parse_html(html).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].snippet.as_deref(), Some("A language empowering everyone."));
        assert_eq!(results[0].domain.as_deref(), Some("rust-lang.org"));
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert!(results[1].snippet.is_none());
    }

    #[test]
    fn test_parse_json_images() {
        let body = json!({"results": [
            {"title": "Ferris", "url": "https://rustacean.net", "image": "https://rustacean.net/ferris.png", "source": "Bing"}
        ]});
        let results = parse_json(&body, SearchKind::Images).unwrap();
        assert_eq!(results[0].url, "https://rustacean.net");
        assert_eq!(results[0].raw.as_ref().unwrap()["image"], "https://rustacean.net/ferris.png");
    }

    #[test]
    fn test_parse_json_news() {
        let body = json!({"results": [
            {"title": "Rust 2.0", "url": "https://news.example/rust", "excerpt": "Big news", "date": 1704067200}
        ]});
        let results = parse_json(&body, SearchKind::News).unwrap();
        assert_eq!(results[0].snippet.as_deref(), Some("Big news"));
        assert_eq!(results[0].published_date.as_deref(), Some("1704067200"));
    }

    #[test]
    fn test_parse_json_missing_results() {
        assert!(parse_json(&json!({}), SearchKind::News).is_err());
    }
}
