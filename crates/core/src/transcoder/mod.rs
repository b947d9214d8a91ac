//! Third-party transcoding integration.
//!
//! Jobs are submitted by source URL and then observed by polling. State and
//! progress belong to the external service; they are passed through verbatim
//! and never cached here.

mod theta;
mod types;

pub use theta::ThetaClient;
pub use types::{JobStatus, TranscodeJob, PLAYBACK_POLICY};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the transcoding service.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The service answered with a non-success status. `error` is the
    /// service's own error payload, untouched.
    #[error("Transcoding service error ({status}): {error}")]
    Service { status: u16, error: Value },

    /// The service could not be reached or the connection dropped.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not carry the expected fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Client not configured (missing credentials, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Client for an external transcoding API.
///
/// No retry, backoff or cancellation is applied by implementations.
#[async_trait]
pub trait TranscodeClient: Send + Sync {
    /// Returns the name of this client implementation.
    fn name(&self) -> &str;

    /// Submits `source_url` for transcoding with a public playback policy.
    async fn submit(
        &self,
        source_url: &str,
        collection_tag: Option<&str>,
    ) -> Result<TranscodeJob, TranscodeError>;

    /// Fetches the service's current view of a job.
    async fn get_status(&self, job_id: &str) -> Result<JobStatus, TranscodeError>;
}
