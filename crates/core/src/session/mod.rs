//! The user-visible guessing flow.
//!
//! [`SessionController`] is a synchronous state machine. Every operation
//! mutates the session and returns the [`Effect`]s the caller must carry out
//! (start a timer, call a service). Completions come back in through the
//! controller tagged with the token they were issued under, so late results
//! from superseded work are dropped at write time.
//!
//! [`spawn_session`] runs a controller on its own task and executes its
//! effects with tokio timers and the configured services.

mod controller;
mod driver;
mod snapshot;

pub use controller::SessionController;
pub use driver::{spawn_session, SessionHandle, SessionServices};
pub use snapshot::{FeedbackView, NoticeView, SessionSnapshot};

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::{EvaluationRequest, ValidationError, MAX_GUESS_CHARS};
use crate::feedback::{FeedbackDraft, FeedbackError};
use crate::reveal::UnknownField;
use crate::token::RequestToken;

/// Per-session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Quiet period before a series lookup fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_max_guess_chars")]
    pub max_guess_chars: usize,
    /// Sessions untouched for this long are dropped by the server.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_suggestions() -> usize {
    5
}

fn default_max_guess_chars() -> usize {
    MAX_GUESS_CHARS
}

fn default_idle_timeout() -> u64 {
    1800
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_suggestions: default_max_suggestions(),
            max_guess_chars: default_max_guess_chars(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Where the user is in the guessing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PickingSeries,
    Guessing,
    Evaluating,
    ShowingResult,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PickingSeries => "picking_series",
            Stage::Guessing => "guessing",
            Stage::Evaluating => "evaluating",
            Stage::ShowingResult => "showing_result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message held on the session until the user dismisses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    SelectSeriesFirst,
    EmptyGuess,
    GuessTooLong,
    EvaluationFailed,
    FeedbackFailed,
    FeedbackSent,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::SelectSeriesFirst => "Please select a TV series first.",
            Notice::EmptyGuess => "Please enter a guess first.",
            Notice::GuessTooLong => "Your guess is too long.",
            Notice::EvaluationFailed => "Something went wrong. Please try again.",
            Notice::FeedbackFailed => "Failed to send feedback. Please try again.",
            Notice::FeedbackSent => "Thank you for your feedback!",
        }
    }

    /// Blocking notices must be dismissed before continuing.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Notice::FeedbackSent)
    }
}

impl From<&ValidationError> for Notice {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::EmptyGuess => Notice::EmptyGuess,
            ValidationError::GuessTooLong { .. } => Notice::GuessTooLong,
            ValidationError::NoSeriesSelected => Notice::SelectSeriesFirst,
        }
    }
}

/// Work the controller asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace any running lookup timer with one firing after `delay`.
    ScheduleLookup {
        token: RequestToken,
        delay: Duration,
    },
    /// Stop the running lookup timer, if any.
    CancelLookup,
    /// Ask the search provider for `query`.
    ResolveSuggestions { token: RequestToken, query: String },
    /// Send a guess to the evaluation service.
    Evaluate {
        token: RequestToken,
        request: EvaluationRequest,
    },
    /// Post feedback.
    SubmitFeedback {
        token: RequestToken,
        submission: FeedbackDraft,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {action} while {stage}")]
    InvalidStage { action: &'static str, stage: Stage },

    #[error("No suggestion labelled '{0}'")]
    UnknownCandidate(String),

    #[error("No evaluation result to reveal")]
    NoResult,

    #[error("An evaluation is already in progress")]
    EvaluationInFlight,

    #[error(transparent)]
    UnknownField(#[from] UnknownField),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("Session closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.max_guess_chars, 1000);
        assert_eq!(config.idle_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_notice_from_validation_error() {
        assert_eq!(
            Notice::from(&ValidationError::NoSeriesSelected),
            Notice::SelectSeriesFirst
        );
        assert!(Notice::SelectSeriesFirst.is_blocking());
        assert!(!Notice::FeedbackSent.is_blocking());
    }

    #[test]
    fn test_invalid_stage_display() {
        let err = SessionError::InvalidStage {
            action: "select a series",
            stage: Stage::ShowingResult,
        };
        assert_eq!(err.to_string(), "Cannot select a series while showing_result");
    }
}
