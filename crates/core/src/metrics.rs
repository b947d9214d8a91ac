//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ingest operations (per-operation outcome and latency)
//! - Collaborators (object store, ffmpeg, transcoding service)
//! - Janitor sweeps

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ingest Metrics
// =============================================================================

/// Ingest operations total by operation and result.
pub static INGEST_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zesha_ingest_operations_total",
            "Total ingest operations by outcome",
        ),
        &["operation", "result"], // result: "success", "bad_request", "internal", "upstream"
    )
    .unwrap()
});

/// Ingest operation duration in seconds.
pub static INGEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "zesha_ingest_duration_seconds",
            "Duration of ingest operations",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Collaborator Metrics
// =============================================================================

/// Object store operations by operation and result.
pub static STORAGE_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zesha_storage_operations_total",
            "Object store operations",
        ),
        &["operation", "result"], // operation: "store", "sign"
    )
    .unwrap()
});

/// ffmpeg/ffprobe invocations by operation and result.
pub static EXTRACTOR_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zesha_extractor_operations_total",
            "Metadata extractor invocations",
        ),
        &["operation", "result"], // operation: "thumbnail", "probe"
    )
    .unwrap()
});

/// Transcoding service requests by operation and result.
pub static TRANSCODER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zesha_transcoder_requests_total",
            "Requests to the transcoding service",
        ),
        &["operation", "result"], // result: "success", "error", "transport_error"
    )
    .unwrap()
});

// =============================================================================
// Janitor Metrics
// =============================================================================

/// Files removed by the janitor.
pub static JANITOR_FILES_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "zesha_janitor_files_removed_total",
        "Expired local files removed by the janitor",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Ingest
        Box::new(INGEST_OPERATIONS.clone()),
        Box::new(INGEST_DURATION.clone()),
        // Collaborators
        Box::new(STORAGE_OPERATIONS.clone()),
        Box::new(EXTRACTOR_OPERATIONS.clone()),
        Box::new(TRANSCODER_REQUESTS.clone()),
        // Janitor
        Box::new(JANITOR_FILES_REMOVED.clone()),
    ]
}
