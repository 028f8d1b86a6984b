//! Network seam between the client and the HTTP stack.
//!
//! # Design
//! `RemoteCallClient` only ever sees `HttpRequest`/`HttpResponse` plain
//! data, so tests can script outcomes without sockets. Dropping the future
//! returned by `Transport::send` must abort the request; reqwest does this by
//! closing the connection, which is how per-attempt deadlines and caller
//! cancellation tear down in-flight work.

use async_trait::async_trait;
use tracing::trace;

use crate::error::{ConfigError, TransportError};
use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one POST. Any status code, including 4xx/5xx, is a response;
    /// only failures to obtain a response are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
///
/// Follows redirects, which web-script deployments use to hand the response
/// off to a content host.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        trace!(%status, url = %response.url(), "response headers received");
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let bytes = response.bytes().await.map_err(|e| TransportError::Body(e.to_string()))?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Only failures on the way to the peer are worth another attempt.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        TransportError::Unreachable(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
