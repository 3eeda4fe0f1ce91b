//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service
//! traits, so sessions can be driven end to end without a search provider,
//! an evaluation backend or a feedback endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use plotguess_core::testing::{fixtures, MockEvaluationService, MockSeriesSearcher};
//!
//! let searcher = MockSeriesSearcher::new();
//! let evaluator = MockEvaluationService::new();
//!
//! // Configure mock responses
//! searcher.set_titles(vec!["Breaking Bad", "Breaking News"]).await;
//! evaluator.set_result(Ok(fixtures::breaking_bad_result())).await;
//!
//! // Use in SessionServices...
//! ```

mod mock_evaluation;
mod mock_feedback;
mod mock_searcher;

pub use mock_evaluation::MockEvaluationService;
pub use mock_feedback::MockFeedbackService;
pub use mock_searcher::MockSeriesSearcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::evaluation::EvaluationResult;

    /// A complete verdict with every field populated.
    pub fn evaluation_result(is_correct: bool) -> EvaluationResult {
        EvaluationResult {
            is_correct,
            accuracy: if is_correct { 0.75 } else { 0.2 },
            time_period: Some("Season 2".to_string()),
            explanation: if is_correct {
                "The guess matches a major arc of the season.".to_string()
            } else {
                "Nothing like this happens in the show.".to_string()
            },
            confidence: 0.85,
        }
    }

    /// The verdict for "Walter becomes a drug lord": correct, no time period.
    pub fn breaking_bad_result() -> EvaluationResult {
        EvaluationResult {
            is_correct: true,
            accuracy: 0.8,
            time_period: None,
            explanation: "Walter White gradually becomes the drug lord Heisenberg.".to_string(),
            confidence: 0.9,
        }
    }
}
