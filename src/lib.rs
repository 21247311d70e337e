//! # multisearch
//!
//! Query several web search providers concurrently and merge their results
//! into a single normalized list.
//!
//! This library provides:
//!
//! - One concurrent task per provider, joined before merging
//! - Partial success: a failing provider never discards the others' results
//! - An aggregate error with per-provider troubleshooting hints when all fail
//! - Adapters for Google, SerpAPI, Brave, Exa, Tavily, SearXNG, arXiv and DuckDuckGo
//!
//! ## Example
//!
//! ```rust,no_run
//! use multisearch::{providers::{Arxiv, DuckDuckGo}, Search, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut search = Search::new();
//!     search.add_provider(DuckDuckGo::new()?);
//!     search.add_provider(Arxiv::new()?);
//!
//!     let request = SearchRequest::new("rust async runtime").with_max_results(5);
//!     for result in search.search(&request).await? {
//!         println!("[{}] {}: {}", result.provider, result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod error;
mod hints;
mod provider;
mod query;
mod result;
mod search;
mod transport_http;

pub mod debug;
pub mod providers;
pub mod transport;

pub use aggregator::aggregate_search;
pub use config::{ProviderSettings, SearchConfig, KNOWN_PROVIDERS};
pub use debug::DebugOptions;
pub use error::{AggregateError, ProviderFailure, Result, SearchError};
pub use hints::status_hint;
pub use provider::{Provider, ProviderHandle};
pub use query::{
    SafeSearch, SearchKind, SearchRequest, SortBy, SortOrder, DEFAULT_MAX_RESULTS,
    DEFAULT_TIMEOUT,
};
pub use result::SearchResult;
pub use search::Search;
pub use transport_http::HttpTransport;
