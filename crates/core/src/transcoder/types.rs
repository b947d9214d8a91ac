//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Playback policy requested for every submission.
pub const PLAYBACK_POLICY: &str = "public";

/// A job accepted by the transcoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeJob {
    /// Identifier assigned by the service.
    pub job_id: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_tag: Option<String>,
    /// Client-side token sent with the submission, for correlating
    /// orphaned jobs in logs.
    pub idempotency_token: String,
}

/// The service's reported state of a job.
///
/// `state` and `progress` are opaque: whatever the service reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub state: Option<Value>,
    pub progress: Option<Value>,
}
