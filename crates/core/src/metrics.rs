//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Suggestion lookups against the series search provider
//! - Evaluation requests (outcome and latency)
//! - Feedback submissions
//! - Stale async completions discarded by request tokens

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Suggestions
// =============================================================================

/// Suggestion lookups by outcome.
pub static SUGGESTION_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "plotguess_suggestion_lookups_total",
            "Total series suggestion lookups",
        ),
        &["outcome"], // "matched", "literal_fallback", "provider_error"
    )
    .unwrap()
});

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluation requests by outcome.
pub static EVALUATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("plotguess_evaluations_total", "Total guess evaluations"),
        &["outcome"], // "succeeded", "transport_error", "api_error", "malformed_response"
    )
    .unwrap()
});

/// Evaluation round-trip duration in seconds.
pub static EVALUATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "plotguess_evaluation_duration_seconds",
            "Duration of evaluation service calls",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Feedback
// =============================================================================

/// Feedback submissions by result.
pub static FEEDBACK_SUBMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "plotguess_feedback_submissions_total",
            "Total feedback submissions",
        ),
        &["result"], // "sent", "failed"
    )
    .unwrap()
});

// =============================================================================
// Session
// =============================================================================

/// Async completions dropped because a newer request superseded them.
pub static STALE_COMPLETIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "plotguess_stale_completions_total",
            "Async completions discarded due to a stale request token",
        ),
        &["kind"], // "lookup_timer", "suggestions", "evaluation", "feedback"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SUGGESTION_LOOKUPS.clone()),
        Box::new(EVALUATIONS.clone()),
        Box::new(EVALUATION_DURATION.clone()),
        Box::new(FEEDBACK_SUBMISSIONS.clone()),
        Box::new(STALE_COMPLETIONS.clone()),
    ]
}
