//! Search request representation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debug::DebugOptions;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default result-count limit.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Content-safety level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// No filtering.
    Off,
    /// Moderate filtering.
    #[default]
    Moderate,
    /// Strict filtering.
    Strict,
}

/// Kind of content to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    Text,
    Images,
    News,
}

/// Sort field hint for providers that support ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

/// Sort direction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A provider-agnostic search request.
///
/// Providers ignore the fields they have no use for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: Option<String>,
    /// Comma-separated identifier list, for providers that look up by ID.
    pub id_list: Option<String>,
    /// Maximum number of results per provider.
    pub max_results: u32,
    /// Page number (1-indexed).
    pub page: u32,
    /// Zero-based result offset; overrides `page` where a provider supports both.
    pub start: Option<u32>,
    /// Language (e.g., "en").
    pub language: Option<String>,
    /// Region/country code (e.g., "us").
    pub region: Option<String>,
    /// Content-safety level.
    pub safe_search: SafeSearch,
    /// Kind of content requested.
    pub kind: SearchKind,
    /// Sort field hint.
    pub sort_by: Option<SortBy>,
    /// Sort direction hint.
    pub sort_order: Option<SortOrder>,
    /// Per-call timeout.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Diagnostics configuration.
    #[serde(skip)]
    pub debug: DebugOptions,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            id_list: None,
            max_results: DEFAULT_MAX_RESULTS,
            page: 1,
            start: None,
            language: None,
            region: None,
            safe_search: SafeSearch::default(),
            kind: SearchKind::default(),
            sort_by: None,
            sort_order: None,
            timeout: DEFAULT_TIMEOUT,
            debug: DebugOptions::default(),
        }
    }
}

impl SearchRequest {
    /// Creates a request for the given query text.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Creates a request that looks records up by identifier instead of text.
    pub fn with_ids(id_list: impl Into<String>) -> Self {
        Self {
            id_list: Some(id_list.into()),
            ..Self::default()
        }
    }

    /// Returns the query text if it is non-blank.
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Returns the identifier list if it is non-blank.
    pub fn ids(&self) -> Option<&str> {
        self.id_list
            .as_deref()
            .map(str::trim)
            .filter(|ids| !ids.is_empty())
    }

    /// Zero-based offset derived from `start` or `page`.
    pub fn offset(&self) -> u32 {
        self.start
            .unwrap_or_else(|| self.page.saturating_sub(1).saturating_mul(self.max_results))
    }

    /// Sets the query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the identifier list.
    pub fn with_id_list(mut self, id_list: impl Into<String>) -> Self {
        self.id_list = Some(id_list.into());
        self
    }

    /// Sets the result-count limit.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the zero-based offset.
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the safe search level.
    pub fn with_safe_search(mut self, level: SafeSearch) -> Self {
        self.safe_search = level;
        self
    }

    /// Sets the search kind.
    pub fn with_kind(mut self, kind: SearchKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets sort hints.
    pub fn with_sort(self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.with_sort_by(sort_by).with_sort_order(sort_order)
    }

    /// Sets the sort field alone.
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    /// Sets the sort direction alone.
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the diagnostics configuration.
    pub fn with_debug(mut self, debug: DebugOptions) -> Self {
        self.debug = debug;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_new() {
        let request = SearchRequest::new("test query");
        assert_eq!(request.query.as_deref(), Some("test query"));
        assert!(request.id_list.is_none());
        assert_eq!(request.max_results, 10);
        assert_eq!(request.page, 1);
        assert_eq!(request.safe_search, SafeSearch::Moderate);
        assert_eq!(request.kind, SearchKind::Text);
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
        assert!(!request.debug.enabled);
    }

    #[test]
    fn test_search_request_with_ids() {
        let request = SearchRequest::with_ids("2101.00001,2101.00002");
        assert!(request.query_text().is_none());
        assert_eq!(request.ids(), Some("2101.00001,2101.00002"));
    }

    #[test]
    fn test_query_text_blank_is_none() {
        assert!(SearchRequest::new("   ").query_text().is_none());
        assert!(SearchRequest::new("\t\n").query_text().is_none());
        assert_eq!(SearchRequest::new(" rust ").query_text(), Some("rust"));
    }

    #[test]
    fn test_ids_blank_is_none() {
        assert!(SearchRequest::with_ids("  ").ids().is_none());
    }

    #[test]
    fn test_offset_from_page() {
        let request = SearchRequest::new("q").with_max_results(20).with_page(3);
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_offset_start_wins() {
        let request = SearchRequest::new("q").with_page(3).with_start(5);
        assert_eq!(request.offset(), 5);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let request = SearchRequest::new("q")
            .with_page(1_000_000)
            .with_max_results(10_000);
        assert_eq!(request.offset(), u32::MAX);
    }

    #[test]
    fn test_sort_order_without_sort_by() {
        let request = SearchRequest::new("q").with_sort_order(SortOrder::Ascending);
        assert_eq!(request.sort_order, Some(SortOrder::Ascending));
        assert!(request.sort_by.is_none());
    }

    #[test]
    fn test_with_page_clamps_to_one() {
        let request = SearchRequest::new("q").with_page(0);
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_search_request_builder_chain() {
        let request = SearchRequest::new("rust programming")
            .with_language("en")
            .with_region("us")
            .with_safe_search(SafeSearch::Strict)
            .with_kind(SearchKind::News)
            .with_sort(SortBy::SubmittedDate, SortOrder::Descending)
            .with_timeout(Duration::from_secs(3));

        assert_eq!(request.language.as_deref(), Some("en"));
        assert_eq!(request.region.as_deref(), Some("us"));
        assert_eq!(request.safe_search, SafeSearch::Strict);
        assert_eq!(request.kind, SearchKind::News);
        assert_eq!(request.sort_by, Some(SortBy::SubmittedDate));
        assert_eq!(request.sort_order, Some(SortOrder::Descending));
        assert_eq!(request.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_search_request_serialization() {
        let request = SearchRequest::new("test").with_timeout(Duration::from_millis(2500));
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"query\":\"test\""));
        assert!(json.contains("\"timeout\":2500"));
        assert!(json.contains("\"safe_search\":\"moderate\""));
        assert!(!json.contains("debug"));
    }

    #[test]
    fn test_search_request_deserialization() {
        let json = r#"{"query":null,"id_list":"1234.5678","max_results":5,"page":1,"start":null,
            "language":null,"region":null,"safe_search":"off","kind":"images",
            "sort_by":"lastUpdatedDate","sort_order":"ascending","timeout":1000}"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.ids(), Some("1234.5678"));
        assert_eq!(request.kind, SearchKind::Images);
        assert_eq!(request.sort_by, Some(SortBy::LastUpdatedDate));
        assert_eq!(request.timeout, Duration::from_secs(1));
        assert!(!request.debug.enabled);
    }
}
