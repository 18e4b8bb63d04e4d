//! Transport error types

use thiserror::Error;

/// Failure below the HTTP status line: the request never produced a usable
/// response.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Encode, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // Strip the URL: it carries the API key as a query parameter
        let e = e.without_url();
        if e.is_timeout() {
            Self::timeout(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::connect(format!("Connection failed: {e}"))
        } else if e.is_body() || e.is_decode() {
            Self::decode(format!("Failed to read response: {e}"))
        } else if e.is_builder() {
            Self::encode(format!("Malformed request: {e}"))
        } else {
            Self::other(format!("Request failed: {e}"))
        }
    }
}

/// Transport failure classification, used for logging only. Every kind is
/// terminal for the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Request or response exceeded the client timeout
    Timeout,
    /// Could not connect to the endpoint
    Connect,
    /// Request body could not be built
    Encode,
    /// Response body could not be read or parsed
    Decode,
    Other,
}
