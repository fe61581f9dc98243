use log::{Level, log_enabled, trace};
use serde_json::Value;

/// Receives every raw response body the client gets back, before it is decoded.
pub trait ResponseObserver: Send + Sync {
    fn on_response(&self, path: &str, body: &Value);
}

/// Writes responses through the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ResponseObserver for LogObserver {
    fn on_response(&self, path: &str, body: &Value) {
        if log_enabled!(target: "ojelectronics::response", Level::Trace) {
            trace!(target: "ojelectronics::response", "{} -> {}", path, body);
        }
    }
}
