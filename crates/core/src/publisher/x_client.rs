//! X (Twitter) posting client: v2 posts, v1.1 media upload.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::oauth::{authorization_header, OAuthCredentials};
use super::{NewPost, Publisher, PublisherError, RemotePost};
use crate::config::{ConfigError, PublisherConfig};

/// OAuth 1.0a user-context client for the X API.
pub struct XClient {
    client: reqwest::Client,
    credentials: OAuthCredentials,
    api_base: String,
    upload_base: String,
}

impl XClient {
    /// Fails if any of the four credentials is missing.
    pub fn new(config: &PublisherConfig) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct CreatePostBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<MediaRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplyRef<'a>>,
}

#[derive(Debug, Serialize)]
struct MediaRef<'a> {
    media_ids: &'a [String],
}

#[derive(Debug, Serialize)]
struct ReplyRef<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: Option<RemotePost>,
    #[serde(default)]
    errors: Option<Vec<ApiProblem>>,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    #[serde(alias = "detail")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    errors: Option<Vec<ApiProblem>>,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .detail
            .or_else(|| {
                parsed.errors.map(|errors| {
                    errors
                        .into_iter()
                        .map(|e| e.message)
                        .collect::<Vec<_>>()
                        .join("; ")
                })
            })
            .or(parsed.title)
            .unwrap_or_else(|| body.chars().take(200).collect()),
        Err(_) => body.chars().take(200).collect(),
    }
}

async fn read_failure(response: reqwest::Response) -> PublisherError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PublisherError::Api {
        status,
        message: error_message(&body),
    }
}

#[async_trait]
impl Publisher for XClient {
    fn name(&self) -> &str {
        "x"
    }

    async fn upload_media(&self, bytes: Vec<u8>, mime: &str) -> Result<String, PublisherError> {
        let url = format!("{}/media/upload.json", self.upload_base);
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("media")
            .mime_str(mime)
            .map_err(|e| PublisherError::Media(format!("invalid MIME type {}: {}", mime, e)))?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                authorization_header("POST", &url, &self.credentials, &[]),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublisherError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let upload: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| PublisherError::Parse(e.to_string()))?;

        debug!(media_id = %upload.media_id_string, bytes = size, mime = %mime, "Media uploaded");
        Ok(upload.media_id_string)
    }

    async fn create_post(&self, post: &NewPost) -> Result<RemotePost, PublisherError> {
        let url = format!("{}/tweets", self.api_base);
        let body = CreatePostBody {
            text: &post.text,
            media: (!post.media_ids.is_empty()).then_some(MediaRef {
                media_ids: &post.media_ids,
            }),
            reply: post.reply_to.as_deref().map(|id| ReplyRef {
                in_reply_to_tweet_id: id,
            }),
        };

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                authorization_header("POST", &url, &self.credentials, &[]),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| PublisherError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(read_failure(response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| PublisherError::Http(e.to_string()))?;
        let parsed: CreatePostResponse = serde_json::from_str(&text).map_err(|e| {
            PublisherError::Parse(format!("{} (body: {})", e, text.chars().take(200).collect::<String>()))
        })?;

        match parsed.data {
            Some(remote) => {
                debug!(id = %remote.id, reply_to = ?post.reply_to, "Post created");
                Ok(remote)
            }
            None => {
                let message = parsed
                    .errors
                    .map(|errors| {
                        errors
                            .into_iter()
                            .map(|e| e.message)
                            .collect::<Vec<_>>()
                            .join("; ")
                    })
                    .unwrap_or_else(|| "response carried no post".to_string());
                Err(PublisherError::Parse(message))
            }
        }
    }
}
