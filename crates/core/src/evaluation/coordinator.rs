//! Single-slot evaluation request lifecycle.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::{
    EvaluationError, EvaluationRequest, EvaluationResult, EvaluationService, SubmitError,
    ValidationError,
};
use crate::metrics::{EVALUATIONS, EVALUATION_DURATION, STALE_COMPLETIONS};
use crate::token::{RequestToken, TokenSequence};

/// Where the current evaluation cycle stands.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationState {
    Idle,
    Pending { guess: String, series: String },
    Succeeded { result: EvaluationResult },
    Failed { error: EvaluationError },
}

impl EvaluationState {
    pub fn status(&self) -> &'static str {
        match self {
            EvaluationState::Idle => "idle",
            EvaluationState::Pending { .. } => "pending",
            EvaluationState::Succeeded { .. } => "succeeded",
            EvaluationState::Failed { .. } => "failed",
        }
    }
}

/// A started request: the token to complete it with and the body to send.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationTicket {
    pub token: RequestToken,
    pub request: EvaluationRequest,
}

/// Owns the one evaluation request a session may have in flight.
#[derive(Debug)]
pub struct EvaluationCoordinator {
    state: EvaluationState,
    requests: TokenSequence,
    max_guess_chars: usize,
    started_at: Option<Instant>,
}

impl EvaluationCoordinator {
    pub fn new(max_guess_chars: usize) -> Self {
        Self {
            state: EvaluationState::Idle,
            requests: TokenSequence::new(),
            max_guess_chars,
            started_at: None,
        }
    }

    pub fn state(&self) -> &EvaluationState {
        &self.state
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        match &self.state {
            EvaluationState::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EvaluationError> {
        match &self.state {
            EvaluationState::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, EvaluationState::Pending { .. })
    }

    /// Check preconditions and build the request body.
    pub fn validate(&self, guess: &str, series: &str) -> Result<EvaluationRequest, ValidationError> {
        let guess = guess.trim();
        if guess.is_empty() {
            return Err(ValidationError::EmptyGuess);
        }
        let actual = guess.chars().count();
        if actual > self.max_guess_chars {
            return Err(ValidationError::GuessTooLong {
                actual,
                max: self.max_guess_chars,
            });
        }
        let series = series.trim();
        if series.is_empty() {
            return Err(ValidationError::NoSeriesSelected);
        }

        Ok(EvaluationRequest {
            guess: guess.to_string(),
            tv_show_name: series.to_string(),
        })
    }

    /// Enter `Pending` for a new request.
    ///
    /// Any previous result or error is dropped and any request still in
    /// flight is superseded.
    pub fn begin(&mut self, guess: &str, series: &str) -> Result<EvaluationTicket, ValidationError> {
        let request = self.validate(guess, series)?;
        let token = self.requests.issue();

        self.state = EvaluationState::Pending {
            guess: request.guess.clone(),
            series: request.tv_show_name.clone(),
        };
        self.started_at = Some(Instant::now());

        debug!("Evaluation {} started for '{}'", token, request.tv_show_name);
        Ok(EvaluationTicket { token, request })
    }

    /// Record the outcome of the request tagged `token`.
    ///
    /// Returns false, leaving state untouched, for superseded requests.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<EvaluationResult, EvaluationError>,
    ) -> bool {
        if !self.requests.settle(token) {
            debug!("Discarding stale evaluation {}", token);
            STALE_COMPLETIONS.with_label_values(&["evaluation"]).inc();
            return false;
        }

        let label = match &outcome {
            Ok(_) => "succeeded",
            Err(e) => e.kind(),
        };
        EVALUATIONS.with_label_values(&[label]).inc();
        if let Some(started) = self.started_at.take() {
            EVALUATION_DURATION
                .with_label_values(&[label])
                .observe(started.elapsed().as_secs_f64());
        }

        self.state = match outcome {
            Ok(result) => {
                info!(
                    "Evaluation {} succeeded (correct: {}, accuracy: {:.2})",
                    token, result.is_correct, result.accuracy
                );
                EvaluationState::Succeeded { result }
            }
            Err(error) => {
                warn!("Evaluation {} failed: {}", token, error);
                EvaluationState::Failed { error }
            }
        };
        true
    }

    /// Drop the current cycle; a request still in flight becomes a no-op.
    pub fn invalidate(&mut self) {
        self.requests.invalidate();
        self.started_at = None;
        self.state = EvaluationState::Idle;
    }

    /// Validate, call `service` once and record the outcome.
    ///
    /// The borrow spans the whole call, so nothing can supersede it. Callers
    /// that need supersession (a new guess while one is in flight) drive
    /// [`begin`](Self::begin) and [`complete`](Self::complete) themselves.
    pub async fn submit(
        &mut self,
        service: &dyn EvaluationService,
        guess: &str,
        series: &str,
    ) -> Result<EvaluationResult, SubmitError> {
        let ticket = self.begin(guess, series)?;
        let outcome = service.evaluate(&ticket.request).await;
        self.complete(ticket.token, outcome.clone());
        outcome.map_err(SubmitError::from)
    }
}
