//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the plotguess server:
//! - HTTP request metrics (latency, counts)
//! - Session registry metrics (active, created, evicted)
//! - Core metrics (suggestion lookups, evaluations, feedback, stale completions)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

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
            "plotguess_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("plotguess_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "plotguess_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Live sessions (collected dynamically).
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("plotguess_sessions_active", "Number of live sessions").unwrap()
});

/// Sessions created total.
pub static SESSIONS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "plotguess_sessions_created_total",
        "Total sessions created since startup",
    )
    .unwrap()
});

/// Sessions dropped for inactivity.
pub static SESSIONS_EVICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "plotguess_sessions_evicted_total",
        "Total sessions evicted after the idle timeout",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Sessions
    registry
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(SESSIONS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(SESSIONS_EVICTED_TOTAL.clone()))
        .unwrap();

    // Core metrics (suggestions, evaluations, feedback)
    for metric in plotguess_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Update gauges from current application state before encoding.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SESSIONS_ACTIVE.set(state.sessions().len().await as i64);
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static REVEAL_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"/reveal/[a-z_]+$").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = REVEAL_FIELD.replace_all(&result, "/reveal/{field}");
    result.to_string()
}
