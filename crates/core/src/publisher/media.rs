//! Image download for publishing, and `data:` URIs for local assets.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use super::{FetchedMedia, MediaFetcher, PublisherError};

/// Fetches images over HTTP. `data:` URIs are decoded in place.
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedMedia, PublisherError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PublisherError::Media(format!("download of {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublisherError::Media(format!(
                "download of {} returned {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PublisherError::Media(e.to_string()))?
            .to_vec();

        debug!(url = %url, bytes = bytes.len(), content_type = ?content_type, "Media downloaded");
        Ok(FetchedMedia {
            bytes,
            content_type,
        })
    }
}

/// `data:<mime>;base64,<payload>` for the given bytes.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<FetchedMedia, PublisherError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PublisherError::Media("not a data URI".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PublisherError::Media("data URI has no payload".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| PublisherError::Media("only base64 data URIs are supported".to_string()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| PublisherError::Media(format!("invalid base64 payload: {}", e)))?;
    Ok(FetchedMedia {
        bytes,
        content_type: (!mime.is_empty()).then(|| mime.to_string()),
    })
}
