use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::{handlers, media, middleware::metrics_middleware, transcode};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Limits beyond the address space (32-bit targets) mean "no practical limit".
    let max_upload_bytes =
        usize::try_from(state.config().server.max_upload_bytes).unwrap_or(usize::MAX);
    let public_dir = state.ingest().public_dir().to_path_buf();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/healthz", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Storage and metadata
        .route("/space-upload", post(media::upload_video))
        .route("/generate-signed-url", post(media::generate_signed_url))
        .route("/get-video-metadata", post(media::get_video_metadata))
        .route("/upload-thumbnail", post(media::upload_thumbnail))
        // Transcoding
        .route("/upload-video-to-theta", post(transcode::submit))
        .route("/video-transcoding-status", get(transcode::status))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback_service(ServeDir::new(public_dir))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
