//! Stateless request builder and response classifier for remote calls.
//!
//! # Design
//! `CallCodec` holds only read-only configuration. `build_call` turns a
//! `CallRequest` into an `HttpRequest` and `parse_result` turns an
//! `HttpResponse` into the unwrapped success value or a classified
//! `CallError`. The caller (normally `RemoteCallClient`) executes the
//! round-trip in between, keeping the wire contract deterministic and free of
//! I/O.

use serde_json::Value;

use crate::config::{ClientConfig, ContentMode};
use crate::error::{CallError, ErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CallEnvelope, CallRequest, ResultEnvelope, ResultStatus};

/// Header carrying the optional shared secret.
pub const SHARED_SECRET_HEADER: &str = "x-shared-secret";

#[derive(Debug, Clone)]
pub struct CallCodec {
    endpoint: String,
    content_mode: ContentMode,
    shared_secret: Option<String>,
}

impl CallCodec {
    pub fn new(endpoint: &str, content_mode: ContentMode) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            content_mode,
            shared_secret: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.to_string(),
            content_mode: config.content_mode,
            shared_secret: config.shared_secret.clone(),
        }
    }

    pub fn with_shared_secret(mut self, secret: impl Into<String>) -> Self {
        self.shared_secret = Some(secret.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_call(&self, request: &CallRequest) -> Result<HttpRequest, CallError> {
        if request.action.trim().is_empty() {
            return Err(CallError::new(ErrorKind::InvalidRequest, "action must not be empty", 0));
        }
        let body = serde_json::to_string(&CallEnvelope::from(request))
            .map_err(|e| CallError::new(ErrorKind::InvalidRequest, format!("serialization failed: {e}"), 0))?;

        let mut headers = vec![("content-type".to_string(), self.content_mode.content_type().to_string())];
        if let Some(secret) = &self.shared_secret {
            headers.push((SHARED_SECRET_HEADER.to_string(), secret.clone()));
        }

        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers,
            body,
        })
    }

    /// Classify a response. The returned error carries `attempt = 0`; the
    /// client stamps the real attempt number.
    pub fn parse_result(&self, response: HttpResponse) -> Result<Value, CallError> {
        if !response.is_success() {
            return Err(CallError::http_status(response.status, &response.reason, 0));
        }

        let envelope: ResultEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| CallError::new(ErrorKind::Malformed, format!("invalid result envelope: {e}"), 0))?;

        match envelope.status {
            ResultStatus::Ok => Ok(envelope.response),
            ResultStatus::Error => Err(CallError::new(
                ErrorKind::ServerReported,
                envelope.message.unwrap_or_default(),
                0,
            )),
        }
    }
}
