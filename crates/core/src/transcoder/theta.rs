//! Theta Video API client.
//!
//! Authenticates with a service account id/secret pair sent as the
//! `x-tva-sa-id` / `x-tva-sa-secret` headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::TranscoderConfig;
use crate::metrics::TRANSCODER_REQUESTS;

use super::types::{JobStatus, TranscodeJob, PLAYBACK_POLICY};
use super::{TranscodeClient, TranscodeError};

/// Theta Video API client.
pub struct ThetaClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Serialize)]
struct SubmitVideoRequest<'a> {
    source_uri: &'a str,
    playback_policy: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nft_collection: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ThetaEnvelope {
    body: Option<ThetaBody>,
}

#[derive(Debug, Deserialize)]
struct ThetaBody {
    #[serde(default)]
    videos: Vec<ThetaVideo>,
}

#[derive(Debug, Deserialize)]
struct ThetaVideo {
    id: Option<String>,
    state: Option<Value>,
    progress: Option<Value>,
}

impl ThetaClient {
    /// Create a new Theta client.
    pub fn new(config: &TranscoderConfig) -> Result<Self, TranscodeError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(TranscodeError::NotConfigured(
                "Theta API key and secret are required".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Maps a raw service response to its first video entry.
    ///
    /// Non-success statuses carry the service's `error` field (or the whole
    /// body when there is none) through unchanged.
    fn interpret_response(status: StatusCode, text: &str) -> Result<ThetaVideo, TranscodeError> {
        let body: Value =
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));

        if !status.is_success() {
            let error = match body.get("error") {
                Some(err) => err.clone(),
                None => body,
            };
            return Err(TranscodeError::Service {
                status: status.as_u16(),
                error,
            });
        }

        let envelope: ThetaEnvelope = serde_json::from_value(body).map_err(|e| {
            TranscodeError::MalformedResponse(format!("unexpected response shape: {}", e))
        })?;

        envelope
            .body
            .and_then(|b| b.videos.into_iter().next())
            .ok_or_else(|| TranscodeError::MalformedResponse("response contains no video".into()))
    }

    async fn read_response(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<ThetaVideo, TranscodeError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TRANSCODER_REQUESTS
                .with_label_values(&[operation, "transport_error"])
                .inc();
            error!(error = %e, operation, "Transcoding service response body was cut off");
            TranscodeError::Transport(e)
        })?;
        let result = Self::interpret_response(status, &text);

        let label = if result.is_ok() { "success" } else { "error" };
        TRANSCODER_REQUESTS
            .with_label_values(&[operation, label])
            .inc();

        result
    }
}

#[async_trait]
impl TranscodeClient for ThetaClient {
    fn name(&self) -> &str {
        "theta"
    }

    async fn submit(
        &self,
        source_url: &str,
        collection_tag: Option<&str>,
    ) -> Result<TranscodeJob, TranscodeError> {
        let url = format!("{}/video", self.base_url);
        let idempotency_token = Uuid::new_v4().to_string();

        debug!(
            source = %source_url,
            collection = ?collection_tag,
            token = %idempotency_token,
            "Submitting transcode job"
        );

        let response = self
            .client
            .post(&url)
            .header("x-tva-sa-id", &self.api_key)
            .header("x-tva-sa-secret", &self.api_secret)
            .header("Idempotency-Key", &idempotency_token)
            .json(&SubmitVideoRequest {
                source_uri: source_url,
                playback_policy: PLAYBACK_POLICY,
                nft_collection: collection_tag,
            })
            .send()
            .await
            .map_err(|e| {
                TRANSCODER_REQUESTS
                    .with_label_values(&["submit", "transport_error"])
                    .inc();
                // The request may still have reached the service.
                error!(
                    error = %e,
                    source = %source_url,
                    token = %idempotency_token,
                    "Transcode submission did not complete; a job may have been created"
                );
                TranscodeError::Transport(e)
            })?;

        let video = Self::read_response(response, "submit").await?;
        let job_id = video.id.ok_or_else(|| {
            TranscodeError::MalformedResponse("video entry has no id".to_string())
        })?;

        info!(
            job_id = %job_id,
            source = %source_url,
            token = %idempotency_token,
            "Transcode job accepted"
        );

        Ok(TranscodeJob {
            job_id,
            source_url: source_url.to_string(),
            collection_tag: collection_tag.map(str::to_string),
            idempotency_token,
        })
    }

    async fn get_status(&self, job_id: &str) -> Result<JobStatus, TranscodeError> {
        let url = format!("{}/video/{}", self.base_url, urlencoding::encode(job_id));

        let response = self
            .client
            .get(&url)
            .header("x-tva-sa-id", &self.api_key)
            .header("x-tva-sa-secret", &self.api_secret)
            .send()
            .await
            .map_err(|e| {
                TRANSCODER_REQUESTS
                    .with_label_values(&["status", "transport_error"])
                    .inc();
                TranscodeError::Transport(e)
            })?;

        let video = Self::read_response(response, "status").await?;

        debug!(job_id = %job_id, state = ?video.state, progress = ?video.progress, "Polled job");

        Ok(JobStatus {
            job_id: video.id.unwrap_or_else(|| job_id.to_string()),
            state: video.state,
            progress: video.progress,
        })
    }
}
