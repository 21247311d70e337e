//! Normalized search result record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single search result in the provider-agnostic shape.
///
/// `published_date` keeps the provider's native format; providers disagree
/// on date formats and nothing here normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Result description/snippet.
    pub snippet: Option<String>,
    /// Domain of the source site.
    pub domain: Option<String>,
    /// Published date as reported by the provider.
    pub published_date: Option<String>,
    /// Name of the provider that produced this record.
    pub provider: String,
    /// Provider-specific payload, never interpreted by the library.
    pub raw: Option<Value>,
}

impl SearchResult {
    /// Creates a new search result attributed to `provider`.
    ///
    /// The domain is derived from the URL when it parses.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let domain = domain_of(&url);
        Self {
            url,
            title: title.into(),
            snippet: None,
            domain,
            published_date: None,
            provider: provider.into(),
            raw: None,
        }
    }

    /// Sets the snippet; blank text is ignored.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        let snippet = snippet.trim();
        if !snippet.is_empty() {
            self.snippet = Some(snippet.to_string());
        }
        self
    }

    /// Overrides the source domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the published date.
    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    /// Attaches the raw provider payload.
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Returns the host of `url` without a leading `www.`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches("www.").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_new() {
        let result = SearchResult::new("https://www.Example.com/page", "Title", "google");
        assert_eq!(result.url, "https://www.Example.com/page");
        assert_eq!(result.title, "Title");
        assert_eq!(result.provider, "google");
        assert_eq!(result.domain.as_deref(), Some("example.com"));
        assert!(result.snippet.is_none());
        assert!(result.published_date.is_none());
        assert!(result.raw.is_none());
    }

    #[test]
    fn test_search_result_unparseable_url_has_no_domain() {
        let result = SearchResult::new("not a url", "Title", "p");
        assert!(result.domain.is_none());
    }

    #[test]
    fn test_with_snippet_trims_and_skips_blank() {
        let result = SearchResult::new("https://a.com", "t", "p").with_snippet("  text ");
        assert_eq!(result.snippet.as_deref(), Some("text"));
        let result = SearchResult::new("https://a.com", "t", "p").with_snippet("   ");
        assert!(result.snippet.is_none());
    }

    #[test]
    fn test_with_domain_overrides() {
        let result = SearchResult::new("https://a.com", "t", "p").with_domain("b.org");
        assert_eq!(result.domain.as_deref(), Some("b.org"));
    }

    #[test]
    fn test_with_published_date_keeps_native_format() {
        let result = SearchResult::new("https://a.com", "t", "p").with_published_date("2 days ago");
        assert_eq!(result.published_date.as_deref(), Some("2 days ago"));
    }

    #[test]
    fn test_with_raw() {
        let result = SearchResult::new("https://a.com", "t", "p").with_raw(json!({"rank": 1}));
        assert_eq!(result.raw.unwrap()["rank"], 1);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("http://www.rust-lang.org/learn").as_deref(), Some("rust-lang.org"));
        assert_eq!(domain_of("https://docs.rs").as_deref(), Some("docs.rs"));
        assert!(domain_of("mailto:someone").is_none());
    }

    #[test]
    fn test_search_result_serialization() {
        let result = SearchResult::new("https://example.com", "Title", "brave");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"url\":\"https://example.com\""));
        assert!(json.contains("\"provider\":\"brave\""));
    }
}
