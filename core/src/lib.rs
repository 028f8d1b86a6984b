//! Resilient remote-call client for a web-script backend.
//!
//! # Overview
//! A logical call `(action, args)` is encoded as a JSON envelope, POSTed to a
//! single endpoint under a per-attempt deadline, and classified into the
//! unwrapped `response` value or a tagged `CallError`. Transient failures
//! (timeouts, unreachable endpoint) are retried with linear backoff; all
//! other failures end the call immediately.
//!
//! # Design
//! - `CallCodec` is sans-IO: it builds `HttpRequest` and classifies
//!   `HttpResponse` values without touching the network.
//! - `RemoteCallClient` owns the attempt loop and drives a `Transport`.
//! - Progress and cancellation are injected per call, never global.
//! - Envelope DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod attachment;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod policy;
pub mod progress;
pub mod submit;
pub mod transport;
pub mod types;
pub mod validation;

pub use attachment::ImageAttachment;
pub use client::{CallOptions, RemoteCallClient};
pub use codec::{CallCodec, SHARED_SECRET_HEADER};
pub use config::{ClientConfig, ContentMode};
pub use error::{CallError, ConfigError, ErrorKind, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use policy::RetryPolicy;
pub use progress::{LoadingProgress, LoadingSink, ProgressNotifier};
pub use submit::{submit_entry, SubmitError, SubmitReceipt, SUBMIT_ACTION};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ReqwestTransport, Transport};
pub use types::{CallEnvelope, CallRequest, ResultEnvelope, ResultStatus};
pub use validation::{DriverEntry, EntryForm, ValidationError};
