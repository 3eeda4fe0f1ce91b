//! Mock series searcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::search::{SearchError, SeriesSearcher};

/// A query handler that produces titles dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<String>> + Send + Sync>;

/// Mock implementation of the SeriesSearcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable titles, globally or per query
/// - Track queries for assertions
/// - Simulate failures and (per-query) latency, for out-of-order responses
///
/// # Example
///
/// ```rust,ignore
/// use plotguess_core::testing::MockSeriesSearcher;
///
/// let searcher = MockSeriesSearcher::new();
/// searcher.set_titles(vec!["Breaking Bad", "Breaking News"]).await;
/// searcher.set_delay_for("Br", Duration::from_secs(2)).await;
///
/// let titles = searcher.search_series("Breaking").await?;
/// assert_eq!(searcher.recorded_queries().await, vec!["Breaking"]);
/// ```
pub struct MockSeriesSearcher {
    /// Titles returned when no handler matches.
    titles: Arc<RwLock<Vec<String>>>,
    /// Recorded queries, in call order.
    queries: Arc<RwLock<Vec<String>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
    /// Latency applied to every search.
    delay: Arc<RwLock<Option<Duration>>>,
    /// Latency overrides keyed by query.
    query_delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Query handler for dynamic results.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockSeriesSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSeriesSearcher")
            .field("titles", &"<titles>")
            .field("queries", &"<queries>")
            .field("next_error", &"<next_error>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSeriesSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSeriesSearcher {
    /// Create a new mock searcher that finds nothing.
    pub fn new() -> Self {
        Self {
            titles: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            query_delays: Arc::new(RwLock::new(HashMap::new())),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the titles returned for subsequent searches.
    pub async fn set_titles<I, S>(&self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.titles.write().await = titles.into_iter().map(Into::into).collect();
    }

    /// Get recorded queries.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every search by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Delay searches for exactly `query` by `delay`.
    pub async fn set_delay_for(&self, query: &str, delay: Duration) {
        self.query_delays
            .write()
            .await
            .insert(query.to_string(), delay);
    }

    /// Set a query handler. Returning `None` falls back to the configured titles.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    async fn delay_for(&self, query: &str) -> Option<Duration> {
        if let Some(delay) = self.query_delays.read().await.get(query) {
            return Some(*delay);
        }
        *self.delay.read().await
    }
}

#[async_trait]
impl SeriesSearcher for MockSeriesSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_series(&self, query: &str) -> Result<Vec<String>, SearchError> {
        self.queries.write().await.push(query.to_string());

        if let Some(delay) = self.delay_for(query).await {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(titles) = h(query) {
                return Ok(titles);
            }
        }
        drop(handler);

        Ok(self.titles.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_configured_titles() {
        let searcher = MockSeriesSearcher::new();
        searcher.set_titles(vec!["Lost", "Lost Girl"]).await;

        let titles = searcher.search_series("Lost").await.unwrap();
        assert_eq!(titles, vec!["Lost", "Lost Girl"]);
        assert_eq!(searcher.search_count().await, 1);
    }

    #[tokio::test]
    async fn test_error_is_consumed() {
        let searcher = MockSeriesSearcher::new();
        searcher.set_next_error(SearchError::RateLimitExceeded).await;

        assert!(searcher.search_series("a").await.is_err());
        assert!(searcher.search_series("b").await.is_ok());
        assert_eq!(searcher.recorded_queries().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_query_handler_overrides_titles() {
        let searcher = MockSeriesSearcher::new();
        searcher.set_titles(vec!["Default"]).await;
        searcher
            .set_query_handler(|q| (q == "Lost").then(|| vec!["Lost".to_string()]))
            .await;

        assert_eq!(searcher.search_series("Lost").await.unwrap(), vec!["Lost"]);
        assert_eq!(searcher.search_series("X").await.unwrap(), vec!["Default"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_query_delay() {
        let searcher = MockSeriesSearcher::new();
        searcher.set_delay_for("slow", Duration::from_secs(5)).await;

        let start = tokio::time::Instant::now();
        searcher.search_series("fast").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        searcher.search_series("slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
