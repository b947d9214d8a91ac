use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use zesha_core::{HealthStatus, SanitizedConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.ingest().health())
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
