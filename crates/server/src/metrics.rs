//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the HTTP surface:
//! - HTTP request metrics (latency, counts, in-flight)
//! - Multipart upload volume
//!
//! Core metrics (ingest outcomes, collaborators, janitor) are registered
//! into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "zesha_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("zesha_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "zesha_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Upload Metrics
// =============================================================================

/// Bytes staged from multipart uploads, by form field.
pub static UPLOAD_BYTES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zesha_upload_bytes_total",
            "Bytes received in multipart file uploads",
        ),
        &["field"], // "video", "thumbnail"
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    let http: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(UPLOAD_BYTES_TOTAL.clone()),
    ];

    // Core metrics (ingest, collaborators, janitor)
    for metric in http.into_iter().chain(zesha_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            error!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

/// Normalize a path for metric labels.
///
/// Thumbnail names embed a UUID; collapsing it keeps label cardinality
/// bounded.
pub fn normalize_path(path: &str) -> String {
    UUID_PATTERN.replace_all(path, "{id}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_thumbnail() {
        let path = "/thumbnail-550e8400-e29b-41d4-a716-446655440000.jpg";
        assert_eq!(normalize_path(path), "/thumbnail-{id}.jpg");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/healthz"), "/api/healthz");
        assert_eq!(
            normalize_path("/api/video-transcoding-status"),
            "/api/video-transcoding-status"
        );
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("zesha_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs vectors that have at least one child.
        zesha_core::metrics::INGEST_OPERATIONS
            .with_label_values(&["health", "success"])
            .inc();
        zesha_core::metrics::JANITOR_FILES_REMOVED.inc_by(0);
        UPLOAD_BYTES_TOTAL.with_label_values(&["video"]).inc_by(0);
        HTTP_REQUESTS_IN_FLIGHT.set(0);

        let output = encode_metrics();

        assert!(output.contains("zesha_ingest_operations_total"));
        assert!(output.contains("zesha_janitor_files_removed_total"));
        assert!(output.contains("zesha_upload_bytes_total"));
        assert!(output.contains("zesha_http_requests_in_flight"));
    }
}
