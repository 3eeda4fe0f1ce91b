//! User feedback side channel.
//!
//! Feedback is independent of the guess flow: the panel opens and closes
//! at any stage and a submission only needs non-empty feedback text.

mod client;
mod panel;

pub use client::{DisabledFeedback, FeedbackConfig, HttpFeedbackClient};
pub use panel::FeedbackPanel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the user typed into the feedback form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub feedback: String,
}

impl FeedbackDraft {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.feedback.is_empty()
    }

    /// The body to post: trimmed, with blank optional fields dropped.
    pub fn to_submission(&self) -> Result<FeedbackDraft, FeedbackError> {
        let feedback = self.feedback.trim();
        if feedback.is_empty() {
            return Err(FeedbackError::EmptyFeedback);
        }
        let optional = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(FeedbackDraft {
            name: optional(&self.name),
            email: optional(&self.email),
            feedback: feedback.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("Feedback text is required")]
    EmptyFeedback,

    #[error("Feedback is already being sent")]
    InFlight,

    #[error("Feedback is not configured")]
    NotConfigured,

    #[error("Feedback request failed: {0}")]
    Transport(String),

    #[error("Feedback service error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Where feedback is delivered.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(&self, submission: &FeedbackDraft) -> Result<(), FeedbackError>;
}
