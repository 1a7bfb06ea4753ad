//! Sequential reply-chained publishing.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::{MediaFetcher, NewPost, PublishRecord, Publisher, PublisherError};
use crate::draft::{DraftError, DraftValidator, PostDraft};
use crate::metrics::{MEDIA_UPLOADS, POSTS_FAILED, POSTS_PUBLISHED, PUBLISH_DURATION};

/// MIME type used when a download carries no content type.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Errors from a publish call.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Rejected before any external call.
    #[error("Nothing was published: {0}")]
    Invalid(#[from] DraftError),

    /// Stopped at `position`; `completed` holds what is already live.
    #[error("Publishing stopped at position {position} after {} posts: {source}", .completed.len())]
    Aborted {
        position: usize,
        completed: Vec<PublishRecord>,
        #[source]
        source: PublisherError,
    },
}

impl PublishError {
    /// Records already published when the call failed.
    pub fn completed(&self) -> &[PublishRecord] {
        match self {
            PublishError::Invalid(_) => &[],
            PublishError::Aborted { completed, .. } => completed,
        }
    }
}

/// Publishes drafts one at a time, each replying to the previous one.
pub struct PublishPipeline {
    publisher: Arc<dyn Publisher>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl PublishPipeline {
    pub fn new(publisher: Arc<dyn Publisher>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { publisher, fetcher }
    }

    pub fn publisher_name(&self) -> &str {
        self.publisher.name()
    }

    /// Publish a single standalone post.
    pub async fn publish_one(
        &self,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<PublishRecord, PublishError> {
        let mut draft = PostDraft::new(text);
        draft.image_url = image_url.map(str::to_string);

        let records = self.run("post", std::slice::from_ref(&draft)).await?;
        records.into_iter().next().ok_or(PublishError::Invalid(DraftError::NoPosts))
    }

    /// Publish `drafts` in order as a reply chain.
    ///
    /// Every draft is validated first; one invalid draft rejects the call
    /// with nothing published. After that, the first failing entry stops
    /// the chain and the error carries the records already created.
    pub async fn publish(&self, drafts: &[PostDraft]) -> Result<Vec<PublishRecord>, PublishError> {
        self.run("thread", drafts).await
    }

    async fn run(&self, kind: &str, drafts: &[PostDraft]) -> Result<Vec<PublishRecord>, PublishError> {
        DraftValidator::validate_for_publish(drafts)?;

        let start = Instant::now();
        let outcome = self.chain(drafts).await;
        let result = if outcome.is_ok() { "success" } else { "failed" };
        PUBLISH_DURATION
            .with_label_values(&[kind, result])
            .observe(start.elapsed().as_secs_f64());
        outcome
    }

    async fn chain(&self, drafts: &[PostDraft]) -> Result<Vec<PublishRecord>, PublishError> {
        let mut records: Vec<PublishRecord> = Vec::with_capacity(drafts.len());

        for (index, draft) in drafts.iter().enumerate() {
            let position = index + 1;
            let reply_to_id = records.last().map(|r| r.remote_id.clone());

            match self.publish_entry(draft, reply_to_id.clone()).await {
                Ok((remote_id, media_id)) => {
                    POSTS_PUBLISHED.inc();
                    info!(
                        publisher = self.publisher.name(),
                        position = position,
                        remote_id = %remote_id,
                        reply_to = ?reply_to_id,
                        "Post published"
                    );
                    records.push(PublishRecord {
                        remote_id,
                        reply_to_id,
                        media_id,
                        text: draft.text.clone(),
                    });
                }
                Err(source) => {
                    POSTS_FAILED.inc();
                    warn!(
                        publisher = self.publisher.name(),
                        position = position,
                        published = records.len(),
                        error = %source,
                        "Publishing aborted"
                    );
                    return Err(PublishError::Aborted {
                        position,
                        completed: records,
                        source,
                    });
                }
            }
        }

        Ok(records)
    }

    async fn publish_entry(
        &self,
        draft: &PostDraft,
        reply_to: Option<String>,
    ) -> Result<(String, Option<String>), PublisherError> {
        let media_id = match draft.image() {
            Some(url) => Some(self.upload(url).await?),
            None => None,
        };

        let post = NewPost {
            text: draft.text.clone(),
            media_ids: media_id.iter().cloned().collect(),
            reply_to,
        };
        let remote = self.publisher.create_post(&post).await?;
        Ok((remote.id, media_id))
    }

    async fn upload(&self, url: &str) -> Result<String, PublisherError> {
        let outcome = async {
            let media = self.fetcher.fetch(url).await?;
            let mime = media
                .content_type
                .as_deref()
                .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
                .filter(|ct| !ct.is_empty())
                .unwrap_or(DEFAULT_MEDIA_TYPE)
                .to_string();
            self.publisher.upload_media(media.bytes, &mime).await
        }
        .await;

        let label = if outcome.is_ok() { "success" } else { "failed" };
        MEDIA_UPLOADS.with_label_values(&[label]).inc();
        outcome
    }
}
