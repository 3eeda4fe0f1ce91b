//! Series title search providers.
//!
//! The suggestion pipeline only needs an ordered list of series titles for a
//! free-text query. Two backends are available: OMDb and TMDB.

mod omdb;
mod tmdb;

pub use omdb::{OmdbClient, OmdbConfig};
pub use tmdb::{TmdbClient, TmdbConfig};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{SearchBackend, SearchConfig};

/// Errors that can occur when querying a series search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// A provider of TV series titles.
#[async_trait]
pub trait SeriesSearcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search for TV series matching `query`.
    ///
    /// Returns titles in provider relevance order. Duplicates are allowed;
    /// callers normalize the list.
    async fn search_series(&self, query: &str) -> Result<Vec<String>, SearchError>;
}

/// Build the searcher selected by `config.backend`.
pub fn create_searcher(config: &SearchConfig) -> Result<Arc<dyn SeriesSearcher>, SearchError> {
    let timeout = Duration::from_secs(u64::from(config.timeout_secs));
    match config.backend {
        SearchBackend::Omdb => {
            let omdb = config.omdb.clone().ok_or_else(|| {
                SearchError::NotConfigured("OMDb backend selected without [search.omdb]".into())
            })?;
            Ok(Arc::new(OmdbClient::new(omdb, timeout)?))
        }
        SearchBackend::Tmdb => {
            let tmdb = config.tmdb.clone().ok_or_else(|| {
                SearchError::NotConfigured("TMDB backend selected without [search.tmdb]".into())
            })?;
            Ok(Arc::new(TmdbClient::new(tmdb, timeout)?))
        }
    }
}
