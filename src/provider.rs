//! Provider trait and the registered handle the aggregator invokes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{Result, SearchRequest, SearchResult};

/// Trait for implementing search providers.
///
/// A provider performs one logical query against its backend and returns
/// records already in the normalized shape. Any failure must be returned as
/// an error, never swallowed into an empty list.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name, used to attribute results and failures.
    fn name(&self) -> &str;

    /// Performs a search and returns normalized results in provider order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;

    /// Whether the provider can look records up by `id_list` instead of text.
    fn supports_id_list(&self) -> bool {
        false
    }

    /// Static troubleshooting guidance for this provider's failures.
    fn troubleshooting_hint(&self) -> Option<&str> {
        None
    }
}

/// A configured provider ready to be invoked.
///
/// Name, hint and capabilities are resolved once when the handle is built.
/// Handles are immutable and cheap to clone, and may be used by many
/// concurrent searches.
#[derive(Clone)]
pub struct ProviderHandle {
    name: Arc<str>,
    hint: Option<Arc<str>>,
    id_list: bool,
    provider: Arc<dyn Provider>,
}

impl ProviderHandle {
    /// Registers a provider.
    pub fn new<P: Provider + 'static>(provider: P) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    /// Registers a shared provider.
    pub fn from_arc(provider: Arc<dyn Provider>) -> Self {
        Self {
            name: Arc::from(provider.name()),
            hint: provider.troubleshooting_hint().map(Arc::from),
            id_list: provider.supports_id_list(),
            provider,
        }
    }

    /// Returns the provider name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the provider's static troubleshooting hint.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Whether the provider accepts an identifier list in place of a query.
    pub fn supports_id_list(&self) -> bool {
        self.id_list
    }

    /// Invokes the provider directly.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        self.provider.search(request).await
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name)
            .field("hint", &self.hint)
            .field("id_list", &self.id_list)
            .finish()
    }
}

impl<P: Provider + 'static> From<P> for ProviderHandle {
    fn from(provider: P) -> Self {
        Self::new(provider)
    }
}
