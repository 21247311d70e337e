//! Search facade over a set of registered providers.

use std::time::Instant;

use tracing::debug;

use crate::aggregator::aggregate_search;
use crate::{Provider, ProviderHandle, Result, SearchRequest, SearchResult};

/// Multi-provider search holding an immutable set of provider handles.
#[derive(Debug, Clone, Default)]
pub struct Search {
    providers: Vec<ProviderHandle>,
}

impl Search {
    /// Creates an empty search instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a search instance from already-built handles.
    pub fn with_providers(providers: Vec<ProviderHandle>) -> Self {
        Self { providers }
    }

    /// Registers a provider.
    pub fn add_provider<P: Provider + 'static>(&mut self, provider: P) {
        self.providers.push(ProviderHandle::new(provider));
    }

    /// Registers an existing handle.
    pub fn add_handle(&mut self, handle: ProviderHandle) {
        self.providers.push(handle);
    }

    /// Returns the number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Returns the registered provider names in invocation order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(ProviderHandle::name).collect()
    }

    /// Returns the registered handles.
    pub fn providers(&self) -> &[ProviderHandle] {
        &self.providers
    }

    /// Performs a search across all registered providers.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let start = Instant::now();
        let results = aggregate_search(request, &self.providers).await;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = results.is_ok(),
            "search finished"
        );
        results
    }
}
