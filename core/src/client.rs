//! Retrying, deadline-bounded client for the web-script backend.
//!
//! # Design
//! `RemoteCallClient` combines a `CallCodec` (pure encode/classify) with a
//! `Transport` (one physical POST). A logical call runs its attempts strictly
//! in sequence: each attempt is raced against its deadline and, when given,
//! the caller's `CancellationToken`. Losing the race drops the transport
//! future, which aborts the request so a late response can never be
//! attributed to a later attempt. Only `Timeout` and `NetworkUnreachable`
//! lead to another attempt, after a linear backoff sleep.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::codec::CallCodec;
use crate::config::ClientConfig;
use crate::error::{CallError, ConfigError, ErrorKind};
use crate::http::HttpRequest;
use crate::policy::RetryPolicy;
use crate::progress::ProgressNotifier;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::CallRequest;

/// Per-call overrides.
#[derive(Clone, Default)]
pub struct CallOptions {
    pub policy: Option<RetryPolicy>,
    pub progress: Option<Arc<dyn ProgressNotifier>>,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressNotifier + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("policy", &self.policy)
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Client for a single remote-call endpoint.
///
/// Cheap to clone; clones share the read-only codec and transport, so
/// independent calls may run concurrently.
#[derive(Clone)]
pub struct RemoteCallClient {
    codec: Arc<CallCodec>,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl fmt::Debug for RemoteCallClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCallClient")
            .field("endpoint", &self.codec.endpoint())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RemoteCallClient {
    /// Build a client that talks HTTP through reqwest.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            codec: Arc::new(CallCodec::from_config(config)),
            transport,
            policy: config.policy,
        })
    }

    pub fn default_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Call `action` with `args` and return the unwrapped `response` value.
    pub async fn call(&self, action: &str, args: Vec<Value>, options: CallOptions) -> Result<Value, CallError> {
        self.execute(CallRequest::new(action, args), options).await
    }

    /// Like `call`, deserializing the response into `T`.
    ///
    /// A response that does not fit `T` is `Malformed`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        action: &str,
        args: Vec<Value>,
        options: CallOptions,
    ) -> Result<T, CallError> {
        let (value, attempt) = self.run(CallRequest::new(action, args), options).await?;
        serde_json::from_value(value)
            .map_err(|e| CallError::new(ErrorKind::Malformed, format!("unexpected response shape: {e}"), attempt))
    }

    pub async fn execute(&self, request: CallRequest, options: CallOptions) -> Result<Value, CallError> {
        self.run(request, options).await.map(|(value, _)| value)
    }

    /// Returns the success value together with the attempt that produced it.
    #[instrument(name = "remote_call", skip(self, request, options), fields(action = %request.action))]
    async fn run(&self, request: CallRequest, options: CallOptions) -> Result<(Value, u32), CallError> {
        let http_request = self.codec.build_call(&request)?;
        let policy = options.policy.unwrap_or(self.policy);
        if policy.per_attempt_timeout.is_zero() {
            return Err(CallError::new(
                ErrorKind::InvalidRequest,
                "per-attempt timeout must be greater than zero",
                0,
            ));
        }
        let total = policy.max_attempts();
        let cancel = options.cancel.as_ref();

        let mut attempt = 1;
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(cancelled(attempt - 1));
            }
            if let Some(progress) = &options.progress {
                progress.on_attempt(attempt, total);
            }

            debug!(attempt, total, "sending remote call");
            let outcome = match self.attempt(&http_request, &policy, attempt, cancel).await {
                Some(outcome) => outcome,
                None => return Err(cancelled(attempt)),
            };

            match outcome {
                Ok(value) => {
                    debug!(attempt, "remote call succeeded");
                    return Ok((value, attempt));
                }
                Err(err) if err.is_retryable() && attempt < total => {
                    let delay = policy.backoff_after(attempt);
                    warn!(attempt, total, kind = %err.kind, error = %err.message, ?delay, "retrying remote call");
                    if with_cancel(cancel, tokio::time::sleep(delay)).await.is_none() {
                        return Err(cancelled(attempt));
                    }
                    attempt += 1;
                }
                Err(err) => {
                    debug!(attempt, kind = %err.kind, error = %err.message, "remote call failed");
                    return Err(err);
                }
            }
        }
    }

    /// One physical attempt. `None` means the caller cancelled mid-flight.
    async fn attempt(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
        attempt: u32,
        cancel: Option<&CancellationToken>,
    ) -> Option<Result<Value, CallError>> {
        let timeout = policy.per_attempt_timeout;
        let send = tokio::time::timeout(timeout, self.transport.send(request.clone()));

        let outcome = match with_cancel(cancel, send).await? {
            Err(_elapsed) => Err(CallError::new(
                ErrorKind::Timeout,
                format!("no response within {timeout:?}"),
                attempt,
            )),
            Ok(Err(transport_err)) => Err(CallError::from(transport_err).at_attempt(attempt)),
            Ok(Ok(response)) => self.codec.parse_result(response).map_err(|e| e.at_attempt(attempt)),
        };
        Some(outcome)
    }
}

/// Race `fut` against the token; `None` when the token fired first.
async fn with_cancel<F: Future>(cancel: Option<&CancellationToken>, fut: F) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}

fn cancelled(attempt: u32) -> CallError {
    CallError::new(ErrorKind::Cancelled, "call cancelled by caller", attempt)
}
