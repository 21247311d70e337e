//! HTTP transport using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::debug::{self, DebugOptions};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::{Result, SearchError};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; multisearch/0.1)";

/// Longest error body excerpt included in an error message.
const ERROR_EXCERPT_LEN: usize = 200;

/// A transport that performs real HTTP requests via reqwest.
///
/// Each provider owns its own instance, so connections are never shared
/// between providers.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with default settings.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Creates an `HttpTransport` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest, debug: &DebugOptions) -> Result<HttpResponse> {
        let timeout_ms = request.timeout.as_millis() as u64;

        debug::log_request(
            debug,
            "HTTP request",
            json!({
                "method": format!("{:?}", request.method),
                "url": redact(&request.url),
                "timeout_ms": timeout_ms,
            }),
        );

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout_ms))?;

        debug::log_response(
            debug,
            "HTTP response",
            json!({
                "status": status.as_u16(),
                "bytes": body.len(),
            }),
        );

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("error");
            let excerpt: String = body.chars().take(ERROR_EXCERPT_LEN).collect();
            let message = if excerpt.trim().is_empty() {
                format!("HTTP {} {}", status.as_u16(), reason)
            } else {
                format!("HTTP {} {}: {}", status.as_u16(), reason, excerpt.trim())
            };
            return Err(SearchError::Transport {
                status: Some(status.as_u16()),
                message,
                body: Some(body),
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn map_reqwest_error(error: reqwest::Error, timeout_ms: u64) -> SearchError {
    if error.is_timeout() {
        return SearchError::Timeout { timeout_ms };
    }
    SearchError::Transport {
        status: error.status().map(|s| s.as_u16()),
        message: format!("HTTP request failed: {}", error),
        body: None,
    }
}

/// Masks credential-looking query parameters before a URL is logged.
fn redact(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let sensitive = matches!(k.as_ref(), "key" | "api_key" | "apikey" | "token");
            let v = if sensitive { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return parsed.to_string();
    }
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_new() {
        assert!(HttpTransport::new().is_ok());
    }

    #[test]
    fn test_http_transport_with_client() {
        let client = Client::builder().user_agent("test-agent").build().unwrap();
        let _transport = HttpTransport::with_client(client);
    }

    #[test]
    fn test_redact_masks_keys() {
        let redacted = redact("https://api.example.com/search?q=rust&key=secret&api_key=s2");
        assert!(redacted.contains("q=rust"));
        assert!(!redacted.contains("secret"));
        assert!(!redacted.contains("s2"));
    }

    #[test]
    fn test_redact_passes_through_invalid_url() {
        assert_eq!(redact("not a url"), "not a url");
    }

    #[test]
    fn test_redact_without_query() {
        assert_eq!(redact("https://example.com/path"), "https://example.com/path");
    }
}
