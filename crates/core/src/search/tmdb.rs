//! TMDB (The Movie Database) TV search client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SearchError, SeriesSearcher};

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig, timeout: Duration) -> Result<Self, SearchError> {
        if config.api_key.is_empty() {
            return Err(SearchError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl SeriesSearcher for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search_series(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = format!("{}/search/tv", self.base_url);

        debug!("TMDB TV search: query='{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(SearchError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(SearchError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let search_result: TmdbSearchResponse = response.json().await.map_err(|e| {
            SearchError::ParseError(format!("Failed to parse TV search response: {}", e))
        })?;

        Ok(search_result.results.into_iter().map(|r| r.name).collect())
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbTvResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    name: String,
}
