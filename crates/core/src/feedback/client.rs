//! HTTP client for the `/feedback` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeedbackDraft, FeedbackError, FeedbackService};

/// Feedback endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    10
}

pub struct HttpFeedbackClient {
    client: Client,
    url: String,
}

impl HttpFeedbackClient {
    pub fn new(config: FeedbackConfig) -> Result<Self, FeedbackError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl FeedbackService for HttpFeedbackClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, submission: &FeedbackDraft) -> Result<(), FeedbackError> {
        debug!("Posting feedback to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(submission)
            .send()
            .await
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Stand-in used when no `[feedback]` section is configured.
pub struct DisabledFeedback;

#[async_trait]
impl FeedbackService for DisabledFeedback {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn submit(&self, _submission: &FeedbackDraft) -> Result<(), FeedbackError> {
        Err(FeedbackError::NotConfigured)
    }
}
