//! Conditional diagnostics sink.
//!
//! Every component reports through the three log points in this module.
//! Each point is a no-op unless its flag is set on the [`DebugOptions`]
//! carried by the request. Without a custom handler, events go to `tracing`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Callback receiving a diagnostic message and its structured payload.
pub type DebugHandler = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Diagnostics configuration forwarded verbatim to every provider.
#[derive(Clone, Default)]
pub struct DebugOptions {
    /// Master switch for generic diagnostics.
    pub enabled: bool,
    /// Log outgoing HTTP requests.
    pub log_requests: bool,
    /// Log incoming HTTP responses.
    pub log_responses: bool,
    /// Custom sink; events go to `tracing` when absent.
    pub handler: Option<DebugHandler>,
}

impl DebugOptions {
    /// Diagnostics with every log point turned on.
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            log_requests: true,
            log_responses: true,
            handler: None,
        }
    }

    /// Routes events to a custom handler instead of `tracing`.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    fn emit(&self, message: &str, data: &Value) {
        match &self.handler {
            Some(handler) => handler(message, data),
            None => tracing::debug!(target: "multisearch::diagnostics", data = %data, "{}", message),
        }
    }
}

impl fmt::Debug for DebugOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugOptions")
            .field("enabled", &self.enabled)
            .field("log_requests", &self.log_requests)
            .field("log_responses", &self.log_responses)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Generic diagnostic event.
pub fn log(options: &DebugOptions, message: &str, data: Value) {
    if options.enabled {
        options.emit(message, &data);
    }
}

/// Request-phase diagnostic event.
pub fn log_request(options: &DebugOptions, message: &str, data: Value) {
    if options.log_requests {
        options.emit(message, &data);
    }
}

/// Response-phase diagnostic event.
pub fn log_response(options: &DebugOptions, message: &str, data: Value) {
    if options.log_responses {
        options.emit(message, &data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn capture(options: DebugOptions) -> (DebugOptions, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = options.with_handler(move |msg, _| sink.lock().unwrap().push(msg.to_string()));
        (options, seen)
    }

    #[test]
    fn test_default_is_silent() {
        let options = DebugOptions::default();
        assert!(!options.enabled);
        assert!(!options.log_requests);
        assert!(!options.log_responses);
        assert!(options.handler.is_none());
    }

    #[test]
    fn test_log_respects_enabled_flag() {
        let (options, seen) = capture(DebugOptions::default());
        log(&options, "hidden", json!({}));
        assert!(seen.lock().unwrap().is_empty());

        let (options, seen) = capture(DebugOptions {
            enabled: true,
            ..Default::default()
        });
        log(&options, "shown", json!({"n": 1}));
        assert_eq!(*seen.lock().unwrap(), vec!["shown".to_string()]);
    }

    #[test]
    fn test_request_and_response_flags_are_independent() {
        let (options, seen) = capture(DebugOptions {
            log_requests: true,
            ..Default::default()
        });
        log_request(&options, "request", json!({}));
        log_response(&options, "response", json!({}));
        log(&options, "generic", json!({}));
        assert_eq!(*seen.lock().unwrap(), vec!["request".to_string()]);
    }

    #[test]
    fn test_handler_receives_payload() {
        let payload = Arc::new(Mutex::new(Value::Null));
        let sink = Arc::clone(&payload);
        let options = DebugOptions::verbose().with_handler(move |_, data| {
            *sink.lock().unwrap() = data.clone();
        });
        log_response(&options, "resp", json!({"status": 200}));
        assert_eq!(payload.lock().unwrap()["status"], 200);
    }

    #[test]
    fn test_verbose_without_handler_does_not_panic() {
        let options = DebugOptions::verbose();
        log(&options, "to tracing", json!({"k": "v"}));
    }

    #[test]
    fn test_debug_format_hides_handler() {
        let options = DebugOptions::default().with_handler(|_, _| {});
        let debug = format!("{:?}", options);
        assert!(debug.contains("<fn>"));
        assert!(debug.contains("enabled: false"));
    }
}
