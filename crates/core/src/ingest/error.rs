//! Boundary error for ingest operations.

use serde_json::{json, Value};
use thiserror::Error;

/// Uniform failure shape returned by every ingest operation.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Caller input was missing or invalid.
    #[error("{0}")]
    BadRequest(String),

    /// A collaborator failed. `message` is safe to return to callers;
    /// `detail` is for logs only.
    #[error("{message}: {detail}")]
    Internal { message: String, detail: String },

    /// The transcoding service rejected the request. Its error payload is
    /// returned to the caller verbatim.
    #[error("transcoding service error: {error}")]
    Upstream { error: Value },
}

impl IngestError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Internal { .. } | Self::Upstream { .. } => 500,
        }
    }

    /// Response body: `{"error": ...}`. Internal detail is never included.
    pub fn to_body(&self) -> Value {
        match self {
            Self::BadRequest(message) => json!({ "error": message }),
            Self::Internal { message, .. } => json!({ "error": message }),
            Self::Upstream { error } => json!({ "error": error }),
        }
    }

    pub(crate) fn result_label(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Internal { .. } => "internal",
            Self::Upstream { .. } => "upstream",
        }
    }
}
