//! HTTP transport abstraction used by providers.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::debug::DebugOptions;
use crate::{Result, SearchError};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single HTTP call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Fully built URL, query string included.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body for POST requests.
    pub body: Option<Value>,
    /// Timeout for this call.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// Creates a POST request with a JSON body.
    pub fn post(url: impl Into<String>, body: Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
            timeout,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successful (2xx) HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl HttpResponse {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| SearchError::parse(format!("invalid JSON response: {}", e)))
    }

    /// Returns the raw body text, for non-JSON payloads.
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Executes HTTP calls on behalf of a provider.
///
/// Implementations return `SearchError::Transport` for non-2xx responses and
/// network failures, and `SearchError::Timeout` when the request's timeout
/// expires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request.
    async fn execute(&self, request: HttpRequest, debug: &DebugOptions) -> Result<HttpResponse>;
}
