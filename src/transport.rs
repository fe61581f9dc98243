//! HTTP transport used by the client.
//!
//! The client only depends on [`HttpTransport`]; [`UreqTransport`] is the blocking
//! default backed by `ureq`. Any non-200 response is an error at this layer.

use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://owd5-OJ001-app.ojelectronics.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete (DNS, TLS, connect, timeout, ...).
    Network(String),
    /// The server answered with something other than 200 OK.
    Status { path: String, status: u16, status_text: String },
    /// The response body could not be read as JSON.
    Body { path: String, message: String },
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportError::Network(s) => write!(f, "transport error: {}", s),
            TransportError::Status {
                path,
                status,
                status_text,
            } => write!(f, "error response requesting {} {} {}", path, status, status_text),
            TransportError::Body { path, message } => write!(f, "invalid json body from {}: {}", path, message),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Narrow capability the client needs from the network: JSON in, JSON out.
///
/// `path` is relative to the API base (e.g. `/Group/GroupContents`).
pub trait HttpTransport: Send + Sync {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError>;

    fn post_json(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value, TransportError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        UreqTransport {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn read_json(path: &str, mut res: http::Response<ureq::Body>) -> Result<Value, TransportError> {
        let status = res.status();
        if status != http::StatusCode::OK {
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        res.body_mut().read_json::<Value>().map_err(|e| TransportError::Body {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        let mut req = self.agent.get(self.url(path)).header("Accept", "application/json");
        for (k, v) in query {
            req = req.query(*k, *v);
        }
        let res = req.call().map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read_json(path, res)
    }

    fn post_json(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value, TransportError> {
        let mut req = self.agent.post(self.url(path)).header("Accept", "application/json");
        for (k, v) in query {
            req = req.query(*k, *v);
        }
        let res = req.send_json(body).map_err(|e| TransportError::Network(e.to_string()))?;
        Self::read_json(path, res)
    }
}
