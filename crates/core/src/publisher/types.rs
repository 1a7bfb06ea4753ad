use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from the posting provider or the media fetcher.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Media error: {0}")]
    Media(String),
}

/// A post as sent to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub media_ids: Vec<String>,
    pub reply_to: Option<String>,
}

/// A post as acknowledged by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: String,
    pub text: String,
}

/// Outcome of one successfully published draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRecord {
    pub remote_id: String,
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
    pub text: String,
}

/// Downloaded media ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Social posting provider.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Upload media and return the provider's media handle.
    async fn upload_media(&self, bytes: Vec<u8>, mime: &str) -> Result<String, PublisherError>;

    /// Create a post.
    async fn create_post(&self, post: &NewPost) -> Result<RemotePost, PublisherError>;
}

/// Resolves an image URL to bytes.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, PublisherError>;
}
