//! Classified API failures.
//!
//! ERROR HANDLING
//! ==============
//! Every failed call produces exactly one `ApiError`, built where the failure
//! is first observed: `transport` when no response arrived, `from_response`
//! for a non-success status, `unexpected_body` when a success body does not
//! decode. Callers propagate it with `?` and never rebuild it, so the
//! classification made at the boundary is the one the UI sees.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::fmt;

use serde_json::Value;

use super::api::Payload;

/// Status used for failures where no HTTP response was received.
pub const TRANSPORT_STATUS: u16 = 0;

// =============================================================================
// ERROR CODE
// =============================================================================

/// Machine-readable `error_code` values the BFF emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    BackendConnectionError,
    BackendTimeout,
    CircuitOpen,
    Http401,
    /// A code this client does not know; kept verbatim for logging.
    Other(String),
}

impl ErrorCode {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BACKEND_CONNECTION_ERROR" => Self::BackendConnectionError,
            "BACKEND_TIMEOUT" => Self::BackendTimeout,
            "CIRCUIT_OPEN" => Self::CircuitOpen,
            "HTTP_401" => Self::Http401,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BackendConnectionError => "BACKEND_CONNECTION_ERROR",
            Self::BackendTimeout => "BACKEND_TIMEOUT",
            Self::CircuitOpen => "CIRCUIT_OPEN",
            Self::Http401 => "HTTP_401",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse failure taxonomy used by the session store and the views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received.
    Transport,
    /// The session is missing, invalid, or the credentials were rejected.
    AuthenticationRejected,
    /// The BFF answered but its upstream is down, slow, or circuit-broken.
    UpstreamUnavailable,
    /// Any other non-success response.
    Server,
}

// =============================================================================
// API ERROR
// =============================================================================

/// A failed BFF call.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status, or [`TRANSPORT_STATUS`] when nothing came back.
    pub status: u16,
    /// Human-readable message, taken from the server when it sent one.
    pub message: String,
    pub error_code: Option<ErrorCode>,
    /// Raw error body as received, when it was JSON.
    pub payload: Option<Value>,
}

impl ApiError {
    /// A failure where the request never produced a response.
    pub fn transport(err: impl fmt::Display) -> Self {
        Self { status: TRANSPORT_STATUS, message: format!("network error: {err}"), error_code: None, payload: None }
    }

    /// Build from a non-success response. Reads `message`, then FastAPI's
    /// `detail`, then the raw body, then the status reason phrase.
    #[must_use]
    pub fn from_response(status: u16, payload: Payload) -> Self {
        match payload {
            Payload::Json(value) => {
                let message = json_message(&value).unwrap_or_else(|| reason_phrase(status));
                let error_code = value.get("error_code").and_then(Value::as_str).map(ErrorCode::parse);
                Self { status, message, error_code, payload: Some(value) }
            }
            Payload::Raw(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Self { status, message: reason_phrase(status), error_code: None, payload: None };
                }
                let message = trimmed.to_owned();
                Self { status, message, error_code: None, payload: Some(Value::String(text)) }
            }
        }
    }

    /// A success response whose body did not match the expected shape.
    pub fn unexpected_body(status: u16, detail: impl fmt::Display) -> Self {
        tracing::debug!(%status, %detail, "response body did not decode");
        Self { status, message: "unexpected response from server".to_owned(), error_code: None, payload: None }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        if self.status == TRANSPORT_STATUS {
            return ErrorKind::Transport;
        }
        match &self.error_code {
            Some(ErrorCode::BackendConnectionError | ErrorCode::BackendTimeout | ErrorCode::CircuitOpen) => {
                ErrorKind::UpstreamUnavailable
            }
            Some(ErrorCode::Http401) => ErrorKind::AuthenticationRejected,
            _ if self.status == 401 => ErrorKind::AuthenticationRejected,
            _ => ErrorKind::Server,
        }
    }

    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ErrorKind::AuthenticationRejected
    }
}

fn json_message(value: &Value) -> Option<String> {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_owned());
    }
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), ToOwned::to_owned)
}
