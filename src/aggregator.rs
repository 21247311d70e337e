//! Concurrent multi-provider fan-out and result aggregation.
//!
//! Every provider is invoked concurrently with the same request. Each
//! invocation runs in its own task, so a failing or panicking provider never
//! cancels its siblings. Once all tasks settle, successful result lists are
//! concatenated in provider order; the search fails only when every provider
//! failed.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tracing::{debug, warn};

use crate::debug::{self as diagnostics, DebugOptions};
use crate::error::{AggregateError, ProviderFailure};
use crate::hints::choose_hint;
use crate::{ProviderHandle, Result, SearchError, SearchRequest, SearchResult};

/// Settled result of one provider invocation.
#[derive(Debug)]
enum ProviderOutcome {
    Success {
        provider: String,
        results: Vec<SearchResult>,
    },
    Failure(ProviderFailure),
}

impl ProviderOutcome {
    fn settle(handle: &ProviderHandle, result: Result<Vec<SearchResult>>) -> Self {
        match result {
            Ok(results) => Self::Success {
                provider: handle.name().to_string(),
                results,
            },
            Err(err) => {
                let status = err.status_code();
                Self::Failure(ProviderFailure {
                    provider: handle.name().to_string(),
                    message: err.to_string(),
                    status,
                    hint: choose_hint(handle.hint(), status),
                })
            }
        }
    }

    fn panicked(handle: &ProviderHandle, error: tokio::task::JoinError) -> Self {
        Self::Failure(ProviderFailure {
            provider: handle.name().to_string(),
            message: format!("provider task aborted: {}", error),
            status: None,
            hint: handle.hint().map(str::to_string),
        })
    }

    fn report(&self, options: &DebugOptions) {
        match self {
            Self::Success { provider, results } => {
                debug!(provider = %provider, count = results.len(), "provider returned results");
                diagnostics::log(
                    options,
                    "Provider search completed",
                    json!({ "provider": provider, "result_count": results.len() }),
                );
            }
            Self::Failure(failure) => {
                warn!(
                    provider = %failure.provider,
                    status = ?failure.status,
                    error = %failure.message,
                    "provider search failed"
                );
                diagnostics::log(
                    options,
                    "Provider search failed",
                    json!({
                        "provider": failure.provider,
                        "error": failure.message,
                        "status": failure.status,
                        "hint": failure.hint,
                    }),
                );
            }
        }
    }
}

/// Searches every provider concurrently and merges the results.
///
/// Returns the concatenation of all successful providers' results, each
/// provider's own ordering preserved, in provider order. Providers that fail
/// are reported through diagnostics only, as long as at least one provider
/// succeeded (an empty result list counts as success).
///
/// # Errors
///
/// - [`SearchError::Configuration`] if `providers` is empty, or the request
///   has neither a query nor an identifier list some provider accepts. No
///   provider is invoked in that case.
/// - [`SearchError::Aggregate`] if every provider failed.
pub async fn aggregate_search(
    request: &SearchRequest,
    providers: &[ProviderHandle],
) -> Result<Vec<SearchResult>> {
    validate(request, providers)?;

    let names: Vec<&str> = providers.iter().map(ProviderHandle::name).collect();
    debug!(providers = ?names, "starting multi-provider search");
    diagnostics::log(
        &request.debug,
        "Starting multi-provider search",
        json!({ "provider_count": providers.len(), "providers": names }),
    );

    let shared = Arc::new(request.clone());
    let tasks: Vec<_> = providers
        .iter()
        .map(|handle| {
            let handle = handle.clone();
            let request = Arc::clone(&shared);
            tokio::spawn(async move { handle.search(&request).await })
        })
        .collect();

    let outcomes: Vec<ProviderOutcome> = join_all(tasks)
        .await
        .into_iter()
        .zip(providers)
        .map(|(joined, handle)| {
            let outcome = match joined {
                Ok(result) => ProviderOutcome::settle(handle, result),
                Err(err) => ProviderOutcome::panicked(handle, err),
            };
            outcome.report(&request.debug);
            outcome
        })
        .collect();

    merge(outcomes, &request.debug)
}

/// Partitions settled outcomes and applies the decision rule.
fn merge(outcomes: Vec<ProviderOutcome>, options: &DebugOptions) -> Result<Vec<SearchResult>> {
    let total = outcomes.len();
    let mut results = Vec::new();
    let mut failures = Vec::new();
    let mut succeeded = 0usize;

    for outcome in outcomes {
        match outcome {
            ProviderOutcome::Success {
                results: mut provider_results,
                ..
            } => {
                succeeded += 1;
                results.append(&mut provider_results);
            }
            ProviderOutcome::Failure(failure) => failures.push(failure),
        }
    }

    diagnostics::log(
        options,
        "Multi-provider search completed",
        json!({
            "total_results": results.len(),
            "successful_providers": succeeded,
            "total_providers": total,
        }),
    );

    if succeeded == 0 {
        return Err(SearchError::Aggregate(AggregateError::new(failures)));
    }

    debug!(
        results = results.len(),
        "{}/{} providers succeeded", succeeded, total
    );
    Ok(results)
}

/// Checks preconditions before any provider is invoked.
fn validate(request: &SearchRequest, providers: &[ProviderHandle]) -> Result<()> {
    if providers.is_empty() {
        return Err(SearchError::config("at least one provider required"));
    }

    if request.query_text().is_some() {
        return Ok(());
    }

    if request.ids().is_some() {
        if providers.iter().any(ProviderHandle::supports_id_list) {
            return Ok(());
        }
        return Err(SearchError::config(
            "an id list was given but none of the selected providers supports id lookup; a query is required",
        ));
    }

    Err(SearchError::config("a search query or id list is required"))
}
