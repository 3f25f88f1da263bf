// Request Domain Model

use super::error::{DomainError, Result};
use crate::port::{IdProvider, TimeProvider};
use serde::{Deserialize, Serialize};

/// Maximum method token length (e.g. "GET", "PUBLISH")
pub const MAX_METHOD_LEN: usize = 16;

/// Maximum target length in bytes
pub const MAX_TARGET_LEN: usize = 2048;

/// Request ID (UUID v4 in production, deterministic in tests)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Method verb token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method(String);

impl Method {
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(DomainError::InvalidMethod("method cannot be empty".to_string()));
        }
        if s.len() > MAX_METHOD_LEN {
            return Err(DomainError::InvalidMethod(format!(
                "method too long: {} > {}",
                s.len(),
                MAX_METHOD_LEN
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidMethod(format!(
                "method must be alphanumeric, '-' or '_': {s}"
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of work handed from producers to workers.
///
/// Immutable once built. Not `Clone` and not `PartialEq`: identity is the
/// [`RequestId`], and the value moves through the queue by ownership.
#[derive(Debug)]
pub struct Request {
    id: RequestId,
    method: Method,
    target: String,
    payload: Option<Vec<u8>>,
    created_at: i64, // epoch ms
}

impl Request {
    /// Build a request with a fresh UUID and the current wall-clock time
    pub fn new(
        method: impl Into<String>,
        target: impl Into<String>,
        payload: Option<Vec<u8>>,
    ) -> Result<Self> {
        Self::with_id(
            RequestId::new(uuid::Uuid::new_v4().to_string()),
            chrono::Utc::now().timestamp_millis(),
            method,
            target,
            payload,
        )
    }

    /// Build a request with an injected ID and timestamp (deterministic)
    pub fn with_id(
        id: RequestId,
        created_at: i64,
        method: impl Into<String>,
        target: impl Into<String>,
        payload: Option<Vec<u8>>,
    ) -> Result<Self> {
        let method = Method::parse(method)?;
        let target = target.into();
        validate_target(&target)?;

        Ok(Self {
            id,
            method,
            target,
            payload,
            created_at,
        })
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Payload size in bytes (0 when absent)
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Consume the request, yielding its payload
    pub fn into_payload(self) -> Option<Vec<u8>> {
        self.payload
    }
}

fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(DomainError::InvalidTarget("target cannot be empty".to_string()));
    }
    if target.len() > MAX_TARGET_LEN {
        return Err(DomainError::InvalidTarget(format!(
            "target too long: {} > {}",
            target.len(),
            MAX_TARGET_LEN
        )));
    }
    if target.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidTarget(format!(
            "target must not contain whitespace: {target:?}"
        )));
    }
    Ok(())
}

/// Incoming request as submitted by a producer (e.g. one JSON line)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub method: String,
    pub target: String,

    #[serde(default)]
    pub payload: Option<String>,
}

impl NewRequest {
    /// Validate and stamp with an ID and creation time
    pub fn into_request(
        self,
        id_provider: &dyn IdProvider,
        time_provider: &dyn TimeProvider,
    ) -> Result<Request> {
        Request::with_id(
            RequestId::new(id_provider.generate_id()),
            time_provider.now_millis(),
            self.method,
            self.target,
            self.payload.map(String::into_bytes),
        )
    }
}
