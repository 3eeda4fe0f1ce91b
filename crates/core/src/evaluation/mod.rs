//! Guess evaluation against the external AI service.
//!
//! The coordinator owns the single request slot for a session:
//! `Idle -> Pending -> Succeeded | Failed`, with every request tagged by a
//! token so a superseded response can never overwrite a newer cycle.

mod client;
mod coordinator;
mod types;

pub use client::{EvaluationConfig, HttpEvaluationService};
pub use coordinator::{EvaluationCoordinator, EvaluationState, EvaluationTicket};
pub use types::{EvaluationRequest, EvaluationResult};

use async_trait::async_trait;
use thiserror::Error;

/// Maximum guess length in characters.
pub const MAX_GUESS_CHARS: usize = 1000;

/// Precondition failures caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a guess first")]
    EmptyGuess,

    #[error("Guess is too long ({actual} characters, max {max})")]
    GuessTooLong { actual: usize, max: usize },

    #[error("Please select a TV series first")]
    NoSeriesSelected,
}

/// Failures of the evaluation call itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Connection, timeout or other transport failure.
    #[error("Evaluation request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Evaluation service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A success status with a body that is not a valid evaluation.
    #[error("Malformed evaluation response: {0}")]
    MalformedResponse(String),
}

impl EvaluationError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::Transport(_) => "transport_error",
            EvaluationError::Api { .. } => "api_error",
            EvaluationError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Error returned by [`EvaluationCoordinator::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// The external service that judges a plot guess.
#[async_trait]
pub trait EvaluationService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Evaluate one guess. Exactly one request is made per call.
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError>;
}
