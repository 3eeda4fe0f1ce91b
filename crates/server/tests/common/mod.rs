//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock series search, evaluation and feedback services, so whole
//! game sessions can be driven over HTTP without external infrastructure.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use plotguess_core::{
    load_config_from_str,
    testing::{MockEvaluationService, MockFeedbackService, MockSeriesSearcher},
    EvaluationService, FeedbackService, SeriesSearcher, SessionServices,
};
use plotguess_server::registry::SessionRegistry;
use plotguess_server::state::AppState;

/// Re-export fixtures for test convenience
pub use plotguess_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[search]
backend = "omdb"

[search.omdb]
api_key = "test-key"

[session]
debounce_ms = 300
max_suggestions = 5
"#;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test(start_paused = true)]
/// async fn test_create_session() {
///     let fixture = TestFixture::new();
///     let response = fixture.post_empty("/api/v1/sessions").await;
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock series search provider - configure titles
    pub searcher: Arc<MockSeriesSearcher>,
    /// Mock evaluation service - configure verdicts
    pub evaluator: Arc<MockEvaluationService>,
    /// Mock feedback sink
    pub feedback: Arc<MockFeedbackService>,
    /// Session registry behind the router
    pub registry: Arc<SessionRegistry>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        let config = load_config_from_str(TEST_CONFIG).expect("Invalid test config");

        let searcher = Arc::new(MockSeriesSearcher::new());
        let evaluator = Arc::new(MockEvaluationService::new());
        let feedback = Arc::new(MockFeedbackService::new());

        let services = SessionServices {
            searcher: Arc::clone(&searcher) as Arc<dyn SeriesSearcher>,
            evaluator: Arc::clone(&evaluator) as Arc<dyn EvaluationService>,
            feedback: Arc::clone(&feedback) as Arc<dyn FeedbackService>,
        };
        let registry = Arc::new(SessionRegistry::new(config.session.clone(), services));

        let state = Arc::new(AppState::new(config, Arc::clone(&registry)));
        let router = plotguess_server::api::create_router(state);

        Self {
            router,
            searcher,
            evaluator,
            feedback,
            registry,
        }
    }

    /// Create a session and return its id.
    pub async fn create_session(&self) -> String {
        let response = self.post_empty("/api/v1/sessions").await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("session id missing")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
