//! Mock evaluation service for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::evaluation::{EvaluationError, EvaluationRequest, EvaluationResult, EvaluationService};

type Outcome = Result<EvaluationResult, EvaluationError>;

/// Mock implementation of the EvaluationService trait.
///
/// Returns the configured outcome (a correct verdict by default). Queued
/// outcomes take precedence, one per call, which allows scripting a
/// failure followed by a success.
pub struct MockEvaluationService {
    outcome: Arc<RwLock<Outcome>>,
    queued: Arc<RwLock<VecDeque<Outcome>>>,
    requests: Arc<RwLock<Vec<EvaluationRequest>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockEvaluationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEvaluationService {
    pub fn new() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(Ok(fixtures::evaluation_result(true)))),
            queued: Arc::new(RwLock::new(VecDeque::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the outcome returned for every call.
    pub async fn set_result(&self, outcome: Outcome) {
        *self.outcome.write().await = outcome;
    }

    /// Queue an outcome for a single upcoming call.
    pub async fn push_result(&self, outcome: Outcome) {
        self.queued.write().await.push_back(outcome);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn recorded_requests(&self) -> Vec<EvaluationRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl EvaluationService for MockEvaluationService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.queued.write().await.pop_front() {
            return outcome;
        }
        self.outcome.read().await.clone()
    }
}
