//! Mock search provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::searcher::{ProviderHit, SearchError, SearchProvider};

/// A query handler that produces web hits dynamically based on the query.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<ProviderHit>> + Send + Sync>;

/// Mock implementation of the SearchProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable web hits and image URLs
/// - Track web and image queries for assertions
/// - Simulate failures per lookup
///
/// # Example
///
/// ```rust,ignore
/// use postwright_core::testing::{MockSearchProvider, fixtures};
///
/// let provider = Arc::new(MockSearchProvider::new());
/// provider.set_web_hits(vec![fixtures::hit(None, "Rust", "memory safety")]).await;
/// provider.set_images(vec!["https://img.example/1.jpg".into()]).await;
///
/// let aggregator = SearchAggregator::new(provider.clone(), "twitter.com");
/// let result = aggregator.search_combined("rust").await?;
/// assert_eq!(provider.recorded_web_queries().await.len(), 2);
/// ```
pub struct MockSearchProvider {
    /// Web hits returned when no handler answers.
    web_hits: Arc<RwLock<Vec<ProviderHit>>>,
    /// Image URLs returned by every image lookup.
    images: Arc<RwLock<Vec<String>>>,
    /// Recorded web queries.
    web_queries: Arc<RwLock<Vec<String>>>,
    /// Recorded image queries with their start offset.
    image_queries: Arc<RwLock<Vec<(String, u32)>>>,
    /// Web lookups whose query starts with the prefix fail with the error.
    web_errors: Arc<RwLock<Vec<(String, SearchError)>>>,
    /// If set, every image lookup fails with this error.
    image_error: Arc<RwLock<Option<SearchError>>>,
    /// Query handler for dynamic hits.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockSearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearchProvider")
            .field("web_hits", &"<hits>")
            .field("images", &"<images>")
            .field("query_handler", &"<handler>")
            .finish()
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self {
            web_hits: Arc::new(RwLock::new(Vec::new())),
            images: Arc::new(RwLock::new(Vec::new())),
            web_queries: Arc::new(RwLock::new(Vec::new())),
            image_queries: Arc::new(RwLock::new(Vec::new())),
            web_errors: Arc::new(RwLock::new(Vec::new())),
            image_error: Arc::new(RwLock::new(None)),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the web hits returned for every query.
    pub async fn set_web_hits(&self, hits: Vec<ProviderHit>) {
        *self.web_hits.write().await = hits;
    }

    /// Set the image URLs returned for every image lookup.
    pub async fn set_images(&self, images: Vec<String>) {
        *self.images.write().await = images;
    }

    /// Answer web queries dynamically. Returning `None` falls back to the
    /// configured hits.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<ProviderHit>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Fail web lookups whose query starts with `prefix`.
    pub async fn set_web_error_for(&self, prefix: &str, error: SearchError) {
        self.web_errors.write().await.push((prefix.to_string(), error));
    }

    /// Fail every image lookup.
    pub async fn fail_images(&self, error: SearchError) {
        *self.image_error.write().await = Some(error);
    }

    /// Clear injected failures.
    pub async fn clear_errors(&self) {
        self.web_errors.write().await.clear();
        *self.image_error.write().await = None;
    }

    pub async fn recorded_web_queries(&self) -> Vec<String> {
        self.web_queries.read().await.clone()
    }

    pub async fn recorded_image_queries(&self) -> Vec<(String, u32)> {
        self.image_queries.read().await.clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn web_search(&self, query: &str) -> Result<Vec<ProviderHit>, SearchError> {
        self.web_queries.write().await.push(query.to_string());

        if let Some((_, error)) = self
            .web_errors
            .read()
            .await
            .iter()
            .find(|(prefix, _)| query.starts_with(prefix.as_str()))
        {
            return Err(error.clone());
        }

        if let Some(handler) = self.query_handler.read().await.as_ref() {
            if let Some(hits) = handler(query) {
                return Ok(hits);
            }
        }

        Ok(self.web_hits.read().await.clone())
    }

    async fn image_search(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError> {
        self.image_queries
            .write()
            .await
            .push((query.to_string(), start));

        if let Some(error) = self.image_error.read().await.as_ref() {
            return Err(error.clone());
        }
        Ok(self.images.read().await.clone())
    }
}
