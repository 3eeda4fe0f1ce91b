//! Feedback form state.

use tracing::{debug, info, warn};

use super::{FeedbackDraft, FeedbackError};
use crate::metrics::{FEEDBACK_SUBMISSIONS, STALE_COMPLETIONS};
use crate::token::{RequestToken, TokenSequence};

/// The feedback modal: visibility, the draft, and the one submission
/// allowed in flight.
///
/// A failed submission keeps the draft so the user can retry; a successful
/// one clears it and closes the panel.
#[derive(Debug, Default)]
pub struct FeedbackPanel {
    open: bool,
    draft: FeedbackDraft,
    submissions: TokenSequence,
}

impl FeedbackPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the panel. The draft survives for the next open.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &FeedbackDraft {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: FeedbackDraft) {
        self.draft = draft;
    }

    pub fn is_submitting(&self) -> bool {
        self.submissions.live().is_some()
    }

    /// Validate the draft and start a submission.
    pub fn begin_submit(&mut self) -> Result<(RequestToken, FeedbackDraft), FeedbackError> {
        if self.is_submitting() {
            return Err(FeedbackError::InFlight);
        }
        let submission = self.draft.to_submission()?;
        let token = self.submissions.issue();
        debug!("Feedback submission {} started", token);
        Ok((token, submission))
    }

    /// Apply the outcome of submission `token`.
    ///
    /// Returns `None` when the completion is stale and was dropped.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<(), FeedbackError>,
    ) -> Option<Result<(), FeedbackError>> {
        if !self.submissions.settle(token) {
            STALE_COMPLETIONS.with_label_values(&["feedback"]).inc();
            return None;
        }

        match &outcome {
            Ok(()) => {
                info!("Feedback submission {} sent", token);
                FEEDBACK_SUBMISSIONS.with_label_values(&["sent"]).inc();
                self.draft = FeedbackDraft::default();
                self.open = false;
            }
            Err(e) => {
                warn!("Feedback submission {} failed: {}", token, e);
                FEEDBACK_SUBMISSIONS.with_label_values(&["failed"]).inc();
            }
        }
        Some(outcome)
    }
}
