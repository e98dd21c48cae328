//! Failure model for calls to the remote service.

use serde_json::Value;
use thiserror::Error;

/// Result type used by every remote operation.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Classification of a failed remote call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (unreachable host, timeout, reset).
    Transport,
    /// The service answered with a non-2xx status.
    Http,
    /// The response arrived after the session it was issued for had ended.
    StaleSession,
    /// A client-side precondition failed before anything was sent.
    Local,
}

/// Canonical shape of a failed remote call.
///
/// `message` is what collaborators show the user as-is. `data` is the parsed
/// error body when the service sent JSON.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl ServiceError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: msg.into(),
            status: None,
            data: None,
        }
    }

    pub fn local(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Local,
            message: msg.into(),
            status: None,
            data: None,
        }
    }

    pub fn stale_session() -> Self {
        Self {
            kind: ErrorKind::StaleSession,
            message: "session changed while the request was in flight".to_string(),
            status: None,
            data: None,
        }
    }

    /// Build an HTTP failure from a status code and the raw response body.
    ///
    /// The body is parsed as JSON on a best-effort basis; a string `error`
    /// field becomes the message, anything else falls back to `HTTP <status>`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let data = parse_json_body(body);
        let message = data
            .as_ref()
            .and_then(|d| d.get("error"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));

        Self {
            kind: ErrorKind::Http,
            message,
            status: Some(status),
            data,
        }
    }

    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }
}

/// Parse a response body as JSON, treating empty or malformed bodies as absent.
pub fn parse_json_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}
