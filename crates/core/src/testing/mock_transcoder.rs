//! Mock transcoding client for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::transcoder::{JobStatus, TranscodeClient, TranscodeError, TranscodeJob};

/// Mock implementation of [`TranscodeClient`].
///
/// Submitted jobs start as `processing` at progress 0; tests advance them
/// with [`MockTranscodeClient::set_status`]. Unknown job ids produce a 404
/// service error.
#[derive(Debug)]
pub struct MockTranscodeClient {
    submissions: Arc<RwLock<Vec<TranscodeJob>>>,
    status_calls: Arc<RwLock<Vec<String>>>,
    statuses: Arc<RwLock<HashMap<String, JobStatus>>>,
    next_error: Arc<RwLock<Option<TranscodeError>>>,
    next_id: AtomicU64,
}

impl Default for MockTranscodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscodeClient {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            status_calls: Arc::new(RwLock::new(Vec::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get all accepted submissions.
    pub async fn submissions(&self) -> Vec<TranscodeJob> {
        self.submissions.read().await.clone()
    }

    /// Job ids that were polled, in order.
    pub async fn status_calls(&self) -> Vec<String> {
        self.status_calls.read().await.clone()
    }

    /// Set what the service reports for a job.
    pub async fn set_status(&self, job_id: &str, state: Value, progress: Value) {
        self.statuses.write().await.insert(
            job_id.to_string(),
            JobStatus {
                job_id: job_id.to_string(),
                state: Some(state),
                progress: Some(progress),
            },
        );
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<TranscodeError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TranscodeClient for MockTranscodeClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(
        &self,
        source_url: &str,
        collection_tag: Option<&str>,
    ) -> Result<TranscodeJob, TranscodeError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let job_id = format!("video_mock{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let job = TranscodeJob {
            job_id: job_id.clone(),
            source_url: source_url.to_string(),
            collection_tag: collection_tag.map(str::to_string),
            idempotency_token: Uuid::new_v4().to_string(),
        };

        self.submissions.write().await.push(job.clone());
        self.set_status(&job_id, json!("processing"), json!(0)).await;

        Ok(job)
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatus, TranscodeError> {
        self.status_calls.write().await.push(job_id.to_string());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.statuses
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| TranscodeError::Service {
                status: 404,
                error: json!(format!("video {} not found", job_id)),
            })
    }
}
