//! Error types for the search library.

use std::fmt;

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// A precondition was not met before any I/O took place.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-2xx response or network failure.
    #[error("{message}")]
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Human-readable description.
        message: String,
        /// Raw response body, if any.
        body: Option<String>,
    },

    /// The call exceeded its configured timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that expired, in milliseconds.
        timeout_ms: u64,
    },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Every provider failed.
    #[error("{0}")]
    Aggregate(AggregateError),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Shorthand for a [`SearchError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for a [`SearchError::Parse`].
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns the HTTP status code of the underlying transport failure, if known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Parses the transport error body as JSON.
    ///
    /// The body is kept as text and only decoded here, so callers that never
    /// look at it pay nothing.
    pub fn error_body(&self) -> Option<serde_json::Value> {
        match self {
            Self::Transport {
                body: Some(body), ..
            } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// Returns true for [`SearchError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A single provider's failure, annotated with a troubleshooting hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Name of the provider that failed.
    pub provider: String,
    /// Underlying error message.
    pub message: String,
    /// HTTP status code, when the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Troubleshooting guidance chosen for this failure.
    pub hint: Option<String>,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} search failed: {}", self.provider, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\nTroubleshooting: {}", hint)?;
        }
        Ok(())
    }
}

/// Raised when every provider in a fan-out failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    failures: Vec<ProviderFailure>,
}

impl AggregateError {
    /// Creates an aggregate error from failures in invocation order.
    pub fn new(failures: Vec<ProviderFailure>) -> Self {
        Self { failures }
    }

    /// Returns the per-provider failures in invocation order.
    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(provider: &str, message: &str, hint: Option<&str>) -> ProviderFailure {
        ProviderFailure {
            provider: provider.to_string(),
            message: message.to_string(),
            status: None,
            hint: hint.map(str::to_string),
        }
    }

    #[test]
    fn test_error_display_configuration() {
        let err = SearchError::config("at least one provider required");
        assert_eq!(
            err.to_string(),
            "Configuration error: at least one provider required"
        );
    }

    #[test]
    fn test_error_display_parse() {
        let err = SearchError::parse("invalid JSON");
        assert_eq!(err.to_string(), "Failed to parse response: invalid JSON");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = SearchError::Timeout { timeout_ms: 1500 };
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_error_display_transport() {
        let err = SearchError::Transport {
            status: Some(403),
            message: "HTTP 403 Forbidden".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP 403 Forbidden");
        assert_eq!(err.status_code(), Some(403));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_status_code_absent_for_other_variants() {
        assert_eq!(SearchError::parse("x").status_code(), None);
        assert_eq!(SearchError::Timeout { timeout_ms: 1 }.status_code(), None);
    }

    #[test]
    fn test_error_body_parses_json_lazily() {
        let err = SearchError::Transport {
            status: Some(400),
            message: "HTTP 400".to_string(),
            body: Some(r#"{"error":{"message":"bad cx"}}"#.to_string()),
        };
        let body = err.error_body().unwrap();
        assert_eq!(body["error"]["message"], "bad cx");
    }

    #[test]
    fn test_error_body_not_json() {
        let err = SearchError::Transport {
            status: Some(502),
            message: "HTTP 502".to_string(),
            body: Some("<html>Bad Gateway</html>".to_string()),
        };
        assert!(err.error_body().is_none());
    }

    #[test]
    fn test_provider_failure_display_with_hint() {
        let f = failure("google", "HTTP 403 Forbidden", Some("check API key and quota"));
        assert_eq!(
            f.to_string(),
            "google search failed: HTTP 403 Forbidden\nTroubleshooting: check API key and quota"
        );
    }

    #[test]
    fn test_provider_failure_display_without_hint() {
        let f = failure("exa", "boom", None);
        assert_eq!(f.to_string(), "exa search failed: boom");
    }

    #[test]
    fn test_aggregate_display_joins_paragraphs_in_order() {
        let err = AggregateError::new(vec![
            failure("alpha", "first", None),
            failure("beta", "second", Some("retry later")),
        ]);
        assert_eq!(
            err.to_string(),
            "alpha search failed: first\n\nbeta search failed: second\nTroubleshooting: retry later"
        );
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_search_error_aggregate_display() {
        let err = SearchError::Aggregate(AggregateError::new(vec![failure("a", "x", None)]));
        assert_eq!(err.to_string(), "a search failed: x");
    }

    #[test]
    fn test_error_debug() {
        let err = SearchError::Timeout { timeout_ms: 10 };
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Timeout"));
    }
}
