//! Scripted transport and helpers shared by unit tests.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::OjClient;
use crate::models::oj::CustomerId;
use crate::observer::ResponseObserver;
use crate::session::Session;
use crate::transport::{HttpTransport, TransportError};

pub(crate) const API_KEY: &str = "api-key";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Answers requests from a queue of scripted results and records what was sent.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeTransport::default())
    }

    pub fn respond(&self, result: Result<Value, TransportError>) {
        self.responses.lock().unwrap().push_back(result);
    }

    pub fn respond_json(&self, body: Value) {
        self.respond(Ok(body));
    }

    pub fn respond_status(&self, path: &str, status: u16, status_text: &str) {
        self.respond(Err(TransportError::Status {
            path: path.to_string(),
            status,
            status_text: status_text.to_string(),
        }));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str, path: &str, query: &[(&str, &str)], body: Option<&Value>) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            query: query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: body.cloned(),
        });
    }

    fn next(&self) -> Result<Value, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

impl HttpTransport for FakeTransport {
    fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        self.record("GET", path, query, None);
        self.next()
    }

    fn post_json(&self, path: &str, query: &[(&str, &str)], body: &Value) -> Result<Value, TransportError> {
        self.record("POST", path, query, Some(body));
        self.next()
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    seen: Mutex<Vec<(String, Value)>>,
}

impl RecordingObserver {
    pub fn seen(&self) -> Vec<(String, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ResponseObserver for RecordingObserver {
    fn on_response(&self, path: &str, body: &Value) {
        self.seen.lock().unwrap().push((path.to_string(), body.clone()));
    }
}

pub(crate) fn fixture(name: &str) -> Value {
    let json = std::fs::read_to_string(format!("tests/data/{name}")).expect("fixture present");
    serde_json::from_str(&json).expect("parse fixture")
}

/// Signs in against the fake transport and forgets the sign-in request.
pub(crate) fn session_with(transport: &Arc<FakeTransport>) -> Session {
    transport.respond_json(serde_json::json!({"SessionId": "session-id", "ErrorCode": 0}));
    let session = OjClient::with_transport(API_KEY, CustomerId(1), transport.clone())
        .session("user", "secret")
        .expect("scripted sign in");
    transport.clear_requests();
    session
}
