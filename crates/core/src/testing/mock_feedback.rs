//! Mock feedback service for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::feedback::{FeedbackDraft, FeedbackError, FeedbackService};

/// Mock implementation of the FeedbackService trait.
///
/// Accepts every submission unless an error is injected.
pub struct MockFeedbackService {
    submissions: Arc<RwLock<Vec<FeedbackDraft>>>,
    next_error: Arc<RwLock<Option<FeedbackError>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockFeedbackService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedbackService {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: FeedbackError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn recorded_submissions(&self) -> Vec<FeedbackDraft> {
        self.submissions.read().await.clone()
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl FeedbackService for MockFeedbackService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, submission: &FeedbackDraft) -> Result<(), FeedbackError> {
        self.submissions.write().await.push(submission.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
