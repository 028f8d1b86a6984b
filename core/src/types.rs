//! Wire envelopes exchanged with the web-script backend.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any drift between the two crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A logical remote call: which backend action to run, with which arguments.
///
/// Built fresh per call and never mutated once handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub action: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CallRequest {
    pub fn new(action: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            action: action.into(),
            args,
        }
    }
}

/// Wire request body: `{"action": ..., "args": [...]}`.
///
/// Borrows from a `CallRequest` so encoding does not clone the arguments.
#[derive(Debug, Serialize)]
pub struct CallEnvelope<'a> {
    pub action: &'a str,
    pub args: &'a [Value],
}

impl<'a> From<&'a CallRequest> for CallEnvelope<'a> {
    fn from(request: &'a CallRequest) -> Self {
        Self {
            action: &request.action,
            args: &request.args,
        }
    }
}

/// Discriminant of a `ResultEnvelope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

/// Wire response body.
///
/// `response` is meaningful when `status` is `ok`; a backend that returns
/// nothing leaves it absent, which reads as `null`. `message` is meaningful
/// when `status` is `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub status: ResultStatus,
    #[serde(default)]
    pub response: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
