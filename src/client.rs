//! Blocking client for the OJ Electronics cloud API.
//!
//! - Sign in with API key, customer id and user credentials to obtain a [`Session`].
//! - Every call is one HTTP round trip; the body's `ErrorCode` must be 0.
//! - No retries and no session renewal.

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::models::oj::{CustomerId, ErrorStatus, GroupId, SignInRequest, SignInResponse};
use crate::observer::{LogObserver, ResponseObserver};
use crate::session::Session;
use crate::temperature::Temperature;
use crate::transport::{HttpTransport, TransportError, UreqTransport};

/// Client software version reported at sign in.
pub const CLIENT_SW_VERSION: u32 = 1;

pub(crate) const SIGN_IN_PATH: &str = "/UserProfile/SignIn";
pub(crate) const GROUP_CONTENTS_PATH: &str = "/Group/GroupContents";
pub(crate) const UPDATE_GROUP_PATH: &str = "/Group/UpdateGroup";

#[derive(Debug)]
pub enum OjError {
    /// Network failure or non-200 response.
    Transport(TransportError),
    /// Sign in answered with a non-zero error code.
    Authentication { code: i64 },
    /// Group listing answered with a non-zero error code.
    Api { code: i64 },
    /// Group update answered with a non-zero error code.
    Update { group_id: GroupId, code: i64 },
    /// A refreshed listing no longer contains the group.
    GroupNotFound(GroupId),
    /// A response body did not match the expected shape.
    Decode {
        path: String,
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    /// A request body could not be encoded.
    Encode { path: String, source: serde_json::Error },
    /// NaN, infinite or out-of-range setpoint; nothing was sent.
    InvalidSetpoint(Temperature),
}

impl core::fmt::Display for OjError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OjError::Transport(e) => write!(f, "{}", e),
            OjError::Authentication { code } => {
                write!(f, "create session failed to authenticate (error code {})", code)
            }
            OjError::Api { code } => write!(f, "failed to get groups, with error code {}", code),
            OjError::Update { group_id, code } => {
                write!(f, "failed to update group {}, with error code {}", group_id, code)
            }
            OjError::GroupNotFound(id) => write!(f, "group {} not found", id),
            OjError::Decode { path, source } => write!(f, "unexpected response from {}: {}", path, source),
            OjError::Encode { path, source } => write!(f, "failed to encode request to {}: {}", path, source),
            OjError::InvalidSetpoint(t) => write!(f, "setpoint {} °C is not a valid temperature", t.celsius()),
        }
    }
}

impl std::error::Error for OjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OjError::Transport(e) => Some(e),
            OjError::Decode { source, .. } => Some(source),
            OjError::Encode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TransportError> for OjError {
    fn from(value: TransportError) -> Self {
        OjError::Transport(value)
    }
}

impl OjError {
    /// The vendor error code, for errors that carry one.
    pub fn code(&self) -> Option<i64> {
        match self {
            OjError::Authentication { code } | OjError::Api { code } | OjError::Update { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Transport, observer and API key shared by a client and everything created from it.
#[derive(Clone)]
pub(crate) struct ApiContext {
    pub(crate) api_key: String,
    transport: Arc<dyn HttpTransport>,
    observer: Arc<dyn ResponseObserver>,
}

impl ApiContext {
    pub(crate) fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, OjError> {
        debug!("GET {}", path);
        let body = self.transport.get_json(path, query)?;
        self.observer.on_response(path, &body);
        Ok(body)
    }

    pub(crate) fn post<B: Serialize>(&self, path: &str, query: &[(&str, &str)], body: &B) -> Result<Value, OjError> {
        let body = serde_json::to_value(body).map_err(|source| OjError::Encode {
            path: path.to_string(),
            source,
        })?;
        debug!("POST {}", path);
        let res = self.transport.post_json(path, query, &body)?;
        self.observer.on_response(path, &res);
        Ok(res)
    }
}

/// Read `ErrorCode` without committing to the rest of the body's shape.
pub(crate) fn error_code(path: &str, body: &Value) -> Result<i64, OjError> {
    let status: ErrorStatus = serde_path_to_error::deserialize(body).map_err(|source| OjError::Decode {
        path: path.to_string(),
        source,
    })?;
    Ok(status.error_code)
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T, OjError> {
    serde_path_to_error::deserialize(body).map_err(|source| OjError::Decode {
        path: path.to_string(),
        source,
    })
}

pub struct OjClient {
    api: ApiContext,
    customer_id: CustomerId,
}

impl OjClient {
    /// Client against the vendor host using the default `ureq` transport.
    pub fn new(api_key: impl Into<String>, customer_id: CustomerId) -> Self {
        Self::with_transport(api_key, customer_id, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        customer_id: CustomerId,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        OjClient {
            api: ApiContext {
                api_key: api_key.into(),
                transport,
                observer: Arc::new(LogObserver),
            },
            customer_id,
        }
    }

    /// Replace the hook that receives raw response bodies.
    pub fn with_observer(mut self, observer: Arc<dyn ResponseObserver>) -> Self {
        self.api.observer = observer;
        self
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Exchange user credentials for a session.
    pub fn session(&self, username: &str, password: &str) -> Result<Session, OjError> {
        let req = SignInRequest {
            api_key: &self.api.api_key,
            client_sw_version: CLIENT_SW_VERSION,
            customer_id: self.customer_id,
            user_name: username,
            password,
        };
        let body = self.api.post(SIGN_IN_PATH, &[], &req)?;

        let code = error_code(SIGN_IN_PATH, &body)?;
        if code != 0 {
            warn!("Sign in for customer {} rejected with error code {}", self.customer_id.0, code);
            return Err(OjError::Authentication { code });
        }

        let SignInResponse { session_id, .. } = decode(SIGN_IN_PATH, body)?;
        info!("Signed in to OJ Electronics API (customer {})", self.customer_id.0);
        Ok(Session::new(self.api.clone(), session_id))
    }
}
