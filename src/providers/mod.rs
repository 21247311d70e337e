//! Search provider implementations.

use std::sync::Arc;

use crate::transport::Transport;
use crate::transport_http::HttpTransport;
use crate::{Result, SearchError, SearchRequest};

// API-key providers
mod brave;
mod exa;
mod google;
mod serpapi;
mod tavily;

// Keyless providers
mod arxiv;
mod duckduckgo;
mod searxng;

pub use brave::Brave;
pub use exa::Exa;
pub use google::Google;
pub use serpapi::SerpApi;
pub use tavily::Tavily;

pub use arxiv::Arxiv;
pub use duckduckgo::DuckDuckGo;
pub use searxng::SearxNG;

/// Rejects a blank credential with a configuration error.
fn require(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SearchError::config(format!("{} is required", what)));
    }
    Ok(value.to_string())
}

/// Returns the query text or fails for providers that need free text.
fn require_query<'a>(request: &'a SearchRequest, provider: &str) -> Result<&'a str> {
    request
        .query_text()
        .ok_or_else(|| SearchError::config(format!("{} requires a search query", provider)))
}

/// A fresh HTTP transport owned by a single provider instance.
fn own_transport() -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(HttpTransport::new()?))
}

fn trim_base(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
