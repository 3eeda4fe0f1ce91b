//! OMDb (Open Movie Database) search client.
//!
//! OMDb requires an API key and answers `200 OK` even for "no results",
//! signalling it with `"Response": "False"` in the body.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use async_trait::async_trait;

use super::{SearchError, SeriesSearcher};

const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Body errors that mean "nothing matched" rather than a failure.
const NO_MATCH_ERRORS: &[&str] = &["Movie not found!", "Series not found!", "Too many results."];

/// OMDb API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// OMDb API key (required).
    pub api_key: String,
    /// Base URL (default: https://www.omdbapi.com/).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: OmdbConfig, timeout: Duration) -> Result<Self, SearchError> {
        if config.api_key.is_empty() {
            return Err(SearchError::NotConfigured(
                "OMDb API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl SeriesSearcher for OmdbClient {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn search_series(&self, query: &str) -> Result<Vec<String>, SearchError> {
        debug!("OMDb series search: query='{}'", query);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("s", query),
                ("type", "series"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(SearchError::NotConfigured(
                "Invalid OMDb API key".to_string(),
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

        let body: OmdbSearchResponse = response.json().await.map_err(|e| {
            SearchError::ParseError(format!("Failed to parse OMDb search response: {}", e))
        })?;

        body.into_titles()
    }
}

// ============================================================================
// OMDb API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
}

impl OmdbSearchResponse {
    fn into_titles(self) -> Result<Vec<String>, SearchError> {
        if self.response.eq_ignore_ascii_case("true") {
            return Ok(self.search.into_iter().map(|item| item.title).collect());
        }

        match self.error {
            Some(msg) if NO_MATCH_ERRORS.contains(&msg.as_str()) => Ok(vec![]),
            Some(msg) => Err(SearchError::ApiError {
                status: 200,
                message: msg,
            }),
            None => Ok(vec![]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_stub;
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    fn parse(body: &str) -> Result<Vec<String>, SearchError> {
        serde_json::from_str::<OmdbSearchResponse>(body)
            .unwrap()
            .into_titles()
    }

    #[test]
    fn test_parse_results_in_order() {
        let titles = parse(
            r#"{"Search":[
                {"Title":"Breaking Bad","Year":"2008–2013","imdbID":"tt0903747","Type":"series"},
                {"Title":"Breaking News","Year":"2019","imdbID":"tt1","Type":"series"}
            ],"totalResults":"2","Response":"True"}"#,
        )
        .unwrap();
        assert_eq!(titles, vec!["Breaking Bad", "Breaking News"]);
    }

    #[test]
    fn test_parse_not_found_is_empty() {
        let titles = parse(r#"{"Response":"False","Error":"Series not found!"}"#).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn test_parse_other_error_is_api_error() {
        let err = parse(r#"{"Response":"False","Error":"Request limit reached!"}"#).unwrap_err();
        assert!(matches!(err, SearchError::ApiError { status: 200, .. }));
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = OmdbClient::new(
            OmdbConfig {
                api_key: String::new(),
                base_url: None,
            },
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(SearchError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_search_series_sends_series_filter() {
        let router = Router::new().route(
            "/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("type").map(String::as_str), Some("series"));
                assert_eq!(params.get("apikey").map(String::as_str), Some("test-key"));
                let query = params.get("s").cloned().unwrap_or_default();
                Json(serde_json::json!({
                    "Search": [{ "Title": format!("{} Show", query) }],
                    "Response": "True"
                }))
            }),
        );
        let base_url = serve_stub(router).await;

        let client = OmdbClient::new(
            OmdbConfig {
                api_key: "test-key".to_string(),
                base_url: Some(format!("{}/", base_url)),
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let titles = client.search_series("Lost").await.unwrap();
        assert_eq!(titles, vec!["Lost Show"]);
    }

    #[tokio::test]
    async fn test_search_series_maps_rate_limit() {
        let router = Router::new().route(
            "/",
            get(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve_stub(router).await;

        let client = OmdbClient::new(
            OmdbConfig {
                api_key: "test-key".to_string(),
                base_url: Some(format!("{}/", base_url)),
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.search_series("Lost").await.unwrap_err();
        assert!(matches!(err, SearchError::RateLimitExceeded));
    }
}
