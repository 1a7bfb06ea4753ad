//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock providers injected, so search, generation and publishing run
//! end to end without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use postwright_core::{
    testing::{MockLlmClient, MockMediaFetcher, MockPublisher, MockSearchProvider},
    Config, ConfigError, ContentGenerator, PublishPipeline, SearchAggregator,
};
use postwright_server::state::AppState;

/// Re-export fixtures for test convenience
pub use postwright_core::testing::fixtures;

/// Site used to scope platform lookups in tests.
pub const PLATFORM_SITE: &str = "twitter.com";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Web and image search (MockSearchProvider)
/// - Completions (MockLlmClient)
/// - Posting and media upload (MockPublisher)
/// - Image downloads (MockMediaFetcher)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_generate_single() {
///     let fixture = TestFixture::new().await;
///     fixture.llm.push_response("A post").await;
///
///     let response = fixture.post("/api/v1/generate", json!({
///         "sourceText": "Rust 2024 edition",
///         "mode": "single"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub state: Arc<AppState>,
    /// Mock search provider - configure web hits and images
    pub search: Arc<MockSearchProvider>,
    /// Mock completion client - queue responses
    pub llm: Arc<MockLlmClient>,
    /// Mock posting client - inspect and fail posts
    pub publisher: Arc<MockPublisher>,
    /// Mock image downloader
    pub media: Arc<MockMediaFetcher>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON responses.
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with every provider wired to a mock.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let search = Arc::new(MockSearchProvider::new());
        let llm = Arc::new(MockLlmClient::new());
        let publisher = Arc::new(MockPublisher::new());
        let media = Arc::new(MockMediaFetcher::new());

        let aggregator = if test_config.disable_search {
            Err(ConfigError::MissingCredential("search.api_key".to_string()))
        } else {
            Ok(Arc::new(SearchAggregator::new(
                Arc::clone(&search) as Arc<dyn postwright_core::SearchProvider>,
                PLATFORM_SITE,
            )))
        };
        let generator = if test_config.disable_generation {
            Err(ConfigError::MissingCredential("llm.api_key".to_string()))
        } else {
            Ok(Arc::new(ContentGenerator::new(
                Arc::clone(&llm) as Arc<dyn postwright_core::LlmClient>
            )))
        };
        let pipeline = if test_config.disable_publishing {
            Err(ConfigError::MissingCredential(
                "publisher.api_key".to_string(),
            ))
        } else {
            Ok(Arc::new(PublishPipeline::new(
                Arc::clone(&publisher) as Arc<dyn postwright_core::Publisher>,
                Arc::clone(&media) as Arc<dyn postwright_core::MediaFetcher>,
            )))
        };

        let state = Arc::new(
            AppState::new(test_config.config)
                .with_search(aggregator)
                .with_generator(generator)
                .with_pipeline(pipeline),
        );

        // Create router
        let router = postwright_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            search,
            llm,
            publisher,
            media,
        }
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

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request_raw("POST", path, body.as_bytes().to_vec(), "application/json")
            .await
    }

    /// Send a multipart upload with a single `file` field.
    pub async fn upload(&self, path: &str, mime: &str, bytes: &[u8]) -> TestResponse {
        let boundary = "postwright-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let content_type = format!("multipart/form-data; boundary={}", boundary);
        self.request_raw("POST", path, body, &content_type).await
    }

    /// Run the default search flow: one general hit, one platform hit and
    /// `images` shared image URLs.
    pub async fn seed_search(&self, images: usize) {
        self.search
            .set_query_handler(|query| {
                if query.starts_with("site:") {
                    Some(vec![fixtures::hit(
                        Some("platform-hit"),
                        "Rust async thread",
                        "A thread on async rust",
                    )])
                } else {
                    Some(vec![fixtures::hit(
                        Some("general-hit"),
                        "Rust async guide",
                        "Async rust explained with examples",
                    )])
                }
            })
            .await;
        self.search
            .set_images(fixtures::image_urls("seed", images))
            .await;
    }

    /// Send a request with raw body and custom content type.
    async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
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
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    pub config: Config,
    /// Leave the search provider unwired
    pub disable_search: bool,
    /// Leave the completion provider unwired
    pub disable_generation: bool,
    /// Leave the posting provider unwired
    pub disable_publishing: bool,
}

impl TestConfig {
    /// Create config with no providers wired.
    pub fn unconfigured() -> Self {
        Self {
            config: Config::default(),
            disable_search: true,
            disable_generation: true,
            disable_publishing: true,
        }
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
