//! HTTP client for the `/evaluate-guess` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EvaluationError, EvaluationRequest, EvaluationResult, EvaluationService};

/// Evaluation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Full URL of the evaluate endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Request timeout in seconds. LLM-backed evaluation with web search is
    /// slow, so the default is generous.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_url() -> String {
    "http://localhost:8000/evaluate-guess".to_string()
}

fn default_timeout() -> u32 {
    60
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Evaluation service reached over HTTP.
pub struct HttpEvaluationService {
    client: Client,
    url: String,
}

impl HttpEvaluationService {
    pub fn new(config: EvaluationConfig) -> Result<Self, EvaluationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl EvaluationService for HttpEvaluationService {
    fn name(&self) -> &str {
        "http"
    }

    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        debug!(
            "Evaluating guess for '{}' ({} chars)",
            request.tv_show_name,
            request.guess.chars().count()
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EvaluationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(EvaluationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        EvaluationResult::from_json(&body)
    }
}
