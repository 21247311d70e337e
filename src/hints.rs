//! Troubleshooting hints attached to provider failures.

/// Guidance derived from an HTTP status code.
pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 | 403 => Some("Authentication failed: verify the API key is valid and has access to this API"),
        400 => Some("The provider rejected the request parameters: check the query and search options"),
        429 => Some("Rate limit exceeded: slow down requests or upgrade the provider plan"),
        s if s >= 500 => Some("The provider is experiencing an outage: try again later"),
        _ => None,
    }
}

/// Picks the hint for a failure.
///
/// A provider's own static hint always wins over the status-derived one.
pub fn choose_hint(provider_hint: Option<&str>, status: Option<u16>) -> Option<String> {
    provider_hint
        .or_else(|| status.and_then(status_hint))
        .map(str::to_string)
}
