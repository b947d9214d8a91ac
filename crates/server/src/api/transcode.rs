//! Transcoding handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub nft_collection: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    #[serde(default)]
    pub video_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub video_id: String,
    pub state: Option<Value>,
    pub progress: Option<Value>,
}

/// POST /api/upload-video-to-theta
pub async fn submit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(request) = body?;
    let job = state
        .ingest()
        .submit_transcode(&request.url, request.nft_collection.as_deref())
        .await?;
    Ok(Json(SubmitResponse {
        video_id: job.job_id,
    }))
}

/// GET /api/video-transcoding-status?video_id=...
pub async fn status(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StatusParams>, QueryRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Query(params) = params?;
    let status = state.ingest().poll_status(&params.video_id).await?;
    Ok(Json(StatusResponse {
        video_id: status.job_id,
        state: status.state,
        progress: status.progress,
    }))
}
