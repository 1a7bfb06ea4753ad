//! Mock publisher and media fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{
    FetchedMedia, MediaFetcher, NewPost, Publisher, PublisherError, RemotePost,
};

/// Mock implementation of the Publisher trait.
///
/// Remote ids are sequential (`"1000"`, `"1001"`, ...) across posts; media
/// handles are `"media-<n>"`. Every attempted post is recorded, including
/// the one that fails.
pub struct MockPublisher {
    next_id: AtomicU64,
    next_media: AtomicU64,
    posts: Arc<RwLock<Vec<NewPost>>>,
    uploads: Arc<RwLock<Vec<(Vec<u8>, String)>>>,
    /// 1-based attempt number at which create_post fails.
    fail_at: Arc<RwLock<Option<usize>>>,
    fail_uploads: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for MockPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPublisher")
            .field("posts", &"<posts>")
            .field("uploads", &"<uploads>")
            .finish()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            next_media: AtomicU64::new(1),
            posts: Arc::new(RwLock::new(Vec::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            fail_at: Arc::new(RwLock::new(None)),
            fail_uploads: Arc::new(RwLock::new(false)),
        }
    }

    /// Make the `attempt`-th create_post call (1-based) fail.
    pub async fn fail_post_at(&self, attempt: usize) {
        *self.fail_at.write().await = Some(attempt);
    }

    /// Make every media upload fail.
    pub async fn fail_uploads(&self) {
        *self.fail_uploads.write().await = true;
    }

    pub async fn recorded_posts(&self) -> Vec<NewPost> {
        self.posts.read().await.clone()
    }

    /// Uploaded payloads with their MIME types.
    pub async fn recorded_uploads(&self) -> Vec<(Vec<u8>, String)> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload_media(&self, bytes: Vec<u8>, mime: &str) -> Result<String, PublisherError> {
        if *self.fail_uploads.read().await {
            return Err(PublisherError::Api {
                status: 400,
                message: "media rejected".to_string(),
            });
        }
        self.uploads.write().await.push((bytes, mime.to_string()));
        Ok(format!(
            "media-{}",
            self.next_media.fetch_add(1, Ordering::SeqCst)
        ))
    }

    async fn create_post(&self, post: &NewPost) -> Result<RemotePost, PublisherError> {
        let attempt = {
            let mut posts = self.posts.write().await;
            posts.push(post.clone());
            posts.len()
        };

        if *self.fail_at.read().await == Some(attempt) {
            return Err(PublisherError::Api {
                status: 429,
                message: "Too Many Requests".to_string(),
            });
        }

        Ok(RemotePost {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            text: post.text.clone(),
        })
    }
}

/// Mock implementation of the MediaFetcher trait. Unknown URLs fail.
pub struct MockMediaFetcher {
    media: Arc<RwLock<HashMap<String, FetchedMedia>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockMediaFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMediaFetcher")
            .field("media", &"<media>")
            .finish()
    }
}

impl Default for MockMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaFetcher {
    pub fn new() -> Self {
        Self {
            media: Arc::new(RwLock::new(HashMap::new())),
            fetched: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Serve `bytes` for `url` with an optional content type.
    pub async fn set_media(&self, url: &str, bytes: Vec<u8>, content_type: Option<&str>) {
        self.media.write().await.insert(
            url.to_string(),
            FetchedMedia {
                bytes,
                content_type: content_type.map(str::to_string),
            },
        );
    }

    pub async fn recorded_fetches(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl MediaFetcher for MockMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, PublisherError> {
        self.fetched.write().await.push(url.to_string());
        self.media
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| PublisherError::Media(format!("download of {} returned 404 Not Found", url)))
    }
}
