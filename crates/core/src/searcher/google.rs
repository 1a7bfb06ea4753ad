//! Google Custom Search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{ConfigError, SearchConfig};

use super::{LookupStage, ProviderHit, SearchError, SearchProvider};

/// Google Custom Search JSON API client.
pub struct GoogleSearchClient {
    client: Client,
    config: SearchConfig,
}

impl GoogleSearchClient {
    /// Create a client. Fails fast when the key or engine id is missing.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        config.require_credentials()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the API URL for a web lookup, or an image lookup when
    /// `image_start` is given.
    fn build_url(&self, query: &str, image_start: Option<u32>) -> String {
        let mut url = format!(
            "{}?key={}&cx={}&q={}",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&self.config.engine_id),
            urlencoding::encode(query)
        );

        if let Some(start) = image_start {
            url.push_str(&format!(
                "&searchType=image&num={}&start={}",
                self.config.image_page_size, start
            ));
        }

        url
    }

    async fn fetch(&self, url: &str, stage: LookupStage) -> Result<GoogleResponse, SearchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout { stage }
            } else {
                SearchError::upstream(stage, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(SearchError::upstream(
                stage,
                format!("HTTP {}: {}", status, message),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse {
                stage,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    fn name(&self) -> &str {
        "google"
    }

    async fn web_search(&self, query: &str) -> Result<Vec<ProviderHit>, SearchError> {
        let url = self.build_url(query, None);
        let response = self.fetch(&url, LookupStage::Web).await?;
        let items = response.items.unwrap_or_default();

        debug!(query = %query, results = items.len(), "Google web search complete");

        Ok(items
            .into_iter()
            .map(|item| ProviderHit {
                cache_id: item.cache_id,
                title: item.title,
                snippet: item.snippet,
                link: item.link,
            })
            .collect())
    }

    async fn image_search(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError> {
        let url = self.build_url(query, Some(start));
        let response = self.fetch(&url, LookupStage::Images).await?;
        let images: Vec<String> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.link)
            .filter(|link| !link.is_empty())
            .collect();

        debug!(query = %query, start = start, images = images.len(), "Google image search complete");
        Ok(images)
    }
}

// Google API response types
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    cache_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    link: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> SearchConfig {
        SearchConfig {
            api_key: "test-key".to_string(),
            engine_id: "engine-1".to_string(),
            api_base: api_base.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_credentials() {
        let result = GoogleSearchClient::new(SearchConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }

    #[test]
    fn test_build_web_url() {
        let client = GoogleSearchClient::new(config("https://search.example/v1/")).unwrap();
        let url = client.build_url("site:twitter.com rust & c", None);
        assert!(url.starts_with("https://search.example/v1?key=test-key&cx=engine-1"));
        assert!(url.contains("q=site%3Atwitter.com%20rust%20%26%20c"));
        assert!(!url.contains("searchType"));
    }

    #[test]
    fn test_build_image_url() {
        let client = GoogleSearchClient::new(config("https://search.example/v1")).unwrap();
        let url = client.build_url("cats", Some(13));
        assert!(url.contains("searchType=image&num=7&start=13"));
    }

    #[tokio::test]
    async fn test_web_search_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1"))
            .and(query_param("q", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "cacheId": "abc", "title": "Rust", "snippet": "fast", "link": "https://rust-lang.org" },
                    { "title": "Book", "link": "https://doc.rust-lang.org/book" }
                ]
            })))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new(config(&format!("{}/v1", server.uri()))).unwrap();
        let hits = client.web_search("rust").await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].cache_id.as_deref(), Some("abc"));
        assert_eq!(hits[1].cache_id, None);
        assert_eq!(hits[1].snippet, "");
    }

    #[tokio::test]
    async fn test_web_search_without_items_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "customsearch#search" })))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new(config(&format!("{}/v1", server.uri()))).unwrap();
        assert!(client.web_search("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_search_returns_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("searchType", "image"))
            .and(query_param("start", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "title": "a", "link": "https://img.example/a.jpg" },
                    { "title": "b", "link": "https://img.example/b.png" }
                ]
            })))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new(config(&format!("{}/v1", server.uri()))).unwrap();
        let images = client.image_search("cats", 5).await.unwrap();
        assert_eq!(
            images,
            vec!["https://img.example/a.jpg", "https://img.example/b.png"]
        );
    }

    #[tokio::test]
    async fn test_api_error_names_stage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "Daily limit exceeded" }
            })))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new(config(&format!("{}/v1", server.uri()))).unwrap();
        let err = client.image_search("cats", 1).await.unwrap_err();
        assert_eq!(err.stage(), Some(LookupStage::Images));
        assert!(err.to_string().contains("Daily limit exceeded"));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = GoogleSearchClient::new(config(&format!("{}/v1", server.uri()))).unwrap();
        let err = client.web_search("rust").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse { stage: LookupStage::Web, .. }));
    }
}
