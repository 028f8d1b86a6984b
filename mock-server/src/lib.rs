//! In-memory stand-in for the web-script backend.
//!
//! Accepts `POST /exec` with a `{action, args}` JSON body under any content
//! type (clients send `text/plain` to stay a CORS simple request) and always
//! answers HTTP 200 with a `{status, ...}` result envelope, the way script
//! deployments do. The only non-200 answer is 401 for a bad shared secret.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const SHARED_SECRET_HEADER: &str = "x-shared-secret";

#[derive(Deserialize)]
pub struct CallEnvelope {
    pub action: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResultEnvelope {
    Ok { response: Value },
    Error { message: String },
}

impl ResultEnvelope {
    fn ok(response: impl Into<Value>) -> Self {
        ResultEnvelope::Ok { response: response.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        ResultEnvelope::Error { message: message.into() }
    }
}

/// A recorded `submitEntry` payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub receipt: Uuid,
    pub data: Value,
}

#[derive(Clone, Debug, Default)]
pub struct Options {
    /// When set, requests must carry it in `x-shared-secret`.
    pub shared_secret: Option<String>,
}

pub struct Backend {
    entries: RwLock<Vec<Entry>>,
    shared_secret: Option<String>,
}

pub type SharedBackend = Arc<Backend>;

pub fn app() -> Router {
    app_with(Options::default())
}

pub fn app_with(options: Options) -> Router {
    let backend: SharedBackend = Arc::new(Backend {
        entries: RwLock::new(Vec::new()),
        shared_secret: options.shared_secret,
    });
    Router::new().route("/exec", post(exec)).with_state(backend)
}

pub async fn run_with(listener: TcpListener, options: Options) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

async fn exec(
    State(backend): State<SharedBackend>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ResultEnvelope>, StatusCode> {
    if let Some(secret) = &backend.shared_secret {
        let presented = headers.get(SHARED_SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(secret.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    let envelope: CallEnvelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => return Ok(Json(ResultEnvelope::error(format!("Invalid request body: {e}")))),
    };
    debug!(action = %envelope.action, args = envelope.args.len(), "dispatching");
    Ok(Json(dispatch(&backend, envelope).await))
}

async fn dispatch(backend: &Backend, envelope: CallEnvelope) -> ResultEnvelope {
    match envelope.action.as_str() {
        "ping" => ResultEnvelope::ok("pong"),
        "echo" => ResultEnvelope::ok(envelope.args),
        "submitEntry" => submit_entry(backend, envelope.args).await,
        "listEntries" => {
            let entries = backend.entries.read().await;
            match serde_json::to_value(&*entries) {
                Ok(value) => ResultEnvelope::ok(value),
                Err(e) => ResultEnvelope::error(e.to_string()),
            }
        }
        other => ResultEnvelope::error(format!("Unknown action: {other}")),
    }
}

async fn submit_entry(backend: &Backend, args: Vec<Value>) -> ResultEnvelope {
    let Some(data) = args.into_iter().next().filter(Value::is_object) else {
        return ResultEnvelope::error("submitEntry expects an entry object");
    };
    let has_name = data
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return ResultEnvelope::error("Missing required field: name");
    }

    let mut entries = backend.entries.write().await;
    let entry = Entry {
        id: entries.len() as u64 + 1,
        receipt: Uuid::new_v4(),
        data,
    };
    info!(id = entry.id, "entry recorded");
    let response = serde_json::json!({ "id": entry.id, "receipt": entry.receipt });
    entries.push(entry);
    ResultEnvelope::ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_serializes_with_status_tag() {
        let json = serde_json::to_value(ResultEnvelope::ok(serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "response": {"id": 1}}));
    }

    #[test]
    fn error_envelope_serializes_message() {
        let json = serde_json::to_value(ResultEnvelope::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "error", "message": "nope"}));
    }

    #[test]
    fn call_envelope_defaults_args_to_empty() {
        let envelope: CallEnvelope = serde_json::from_str(r#"{"action":"ping"}"#).unwrap();
        assert_eq!(envelope.action, "ping");
        assert!(envelope.args.is_empty());
    }

    #[test]
    fn call_envelope_rejects_missing_action() {
        let result: Result<CallEnvelope, _> = serde_json::from_str(r#"{"args":[]}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn submit_requires_a_name() {
        let backend = Backend {
            entries: RwLock::new(Vec::new()),
            shared_secret: None,
        };
        let result = submit_entry(&backend, vec![serde_json::json!({"phone": "0812345678"})]).await;
        assert_eq!(result, ResultEnvelope::error("Missing required field: name"));
        assert!(backend.entries.read().await.is_empty());
    }
}
