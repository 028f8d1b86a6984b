//! Validated form submission over the remote-call client.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::client::{CallOptions, RemoteCallClient};
use crate::error::{CallError, ErrorKind};
use crate::validation::{EntryForm, ValidationError};

/// Backend action that records a driver entry.
pub const SUBMIT_ACTION: &str = "submitEntry";

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form was rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Call(#[from] CallError),
}

/// What the backend returns for a recorded entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    pub id: u64,
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Validate `form` and submit it as the single argument of `submitEntry`.
pub async fn submit_entry(
    client: &RemoteCallClient,
    form: &EntryForm,
    options: CallOptions,
) -> Result<SubmitReceipt, SubmitError> {
    let entry = form.validate()?;
    let arg = serde_json::to_value(&entry)
        .map_err(|e| CallError::new(ErrorKind::InvalidRequest, format!("serialization failed: {e}"), 0))?;

    let receipt: SubmitReceipt = client.call_as(SUBMIT_ACTION, vec![arg], options).await?;
    info!(id = receipt.id, "entry submitted");
    Ok(receipt)
}
