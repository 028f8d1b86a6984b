//! Error types for the remote-call client.
//!
//! # Design
//! Every failure a caller can observe is a `CallError` tagged with an
//! `ErrorKind`, so callers branch on the category instead of matching on
//! message text. Only `Timeout` and `NetworkUnreachable` are retried; the
//! rest describe deterministic conditions and end the call on first sight.

use std::fmt;

use thiserror::Error;

/// Failure category of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The per-attempt deadline elapsed before a response arrived.
    Timeout,
    /// Connection-level failure before any response (DNS, refused, reset).
    NetworkUnreachable,
    /// The backend answered `status: "error"`.
    ServerReported,
    /// The transport returned a non-2xx status.
    HttpStatus,
    /// The response body was not a valid result envelope.
    Malformed,
    /// The caller cancelled the call.
    Cancelled,
    /// The call was rejected before reaching the network.
    InvalidRequest,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::NetworkUnreachable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkUnreachable => "network unreachable",
            ErrorKind::ServerReported => "server reported",
            ErrorKind::HttpStatus => "http status",
            ErrorKind::Malformed => "malformed response",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::InvalidRequest => "invalid request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal error of a logical remote call.
///
/// `attempt` is the 1-based physical attempt that produced the error, or 0
/// when the call never reached the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (attempt {attempt}): {message}")]
pub struct CallError {
    pub kind: ErrorKind,
    pub message: String,
    pub attempt: u32,
    /// HTTP status code, set for `HttpStatus` errors.
    pub status: Option<u16>,
}

impl CallError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, attempt: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            attempt,
            status: None,
        }
    }

    pub fn http_status(status: u16, reason: &str, attempt: u32) -> Self {
        let message = if reason.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status} {reason}")
        };
        Self {
            kind: ErrorKind::HttpStatus,
            message,
            attempt,
            status: Some(status),
        }
    }

    /// Re-stamp the error with the attempt that produced it.
    pub(crate) fn at_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Failure raised by a `Transport` before a usable response existed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response: DNS, connect or send failure.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The request could not be built or was refused locally, e.g. an
    /// illegal header value or a redirect loop. Retrying cannot help.
    #[error("request rejected before sending: {0}")]
    Request(String),

    /// A response started but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        let kind = match err {
            TransportError::Unreachable(_) => ErrorKind::NetworkUnreachable,
            TransportError::Request(_) => ErrorKind::InvalidRequest,
            TransportError::Body(_) => ErrorKind::Malformed,
        };
        CallError::new(kind, err.to_string(), 0)
    }
}

/// Invalid client configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("invalid endpoint url: {0}")]
    Endpoint(String),

    #[error("per-attempt timeout must be greater than zero")]
    ZeroTimeout,

    /// A custom header would turn the simple request into a preflighted one.
    #[error("a shared secret header requires the json content mode")]
    SecretRequiresJsonMode,

    #[error("shared secret is not a valid header value")]
    InvalidSecret,

    #[error("failed to build http transport: {0}")]
    Transport(String),
}
