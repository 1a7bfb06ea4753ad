use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use super::ConfigError;
use crate::generator::{LlmConfig, LlmProvider};
use crate::images::ImagePoolConfig;
use crate::publisher::OAuthCredentials;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub images: ImagePoolConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Search provider configuration (Google Custom Search).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Provider API key.
    #[serde(default)]
    pub api_key: String,
    /// Scoped search engine id (`cx`).
    #[serde(default)]
    pub engine_id: String,
    /// API endpoint.
    #[serde(default = "default_search_api_base")]
    pub api_base: String,
    /// Site used to scope platform-specific lookups.
    #[serde(default = "default_platform_site")]
    pub platform_site: String,
    /// Number of images requested per image lookup.
    #[serde(default = "default_image_page_size")]
    pub image_page_size: u32,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id: String::new(),
            api_base: default_search_api_base(),
            platform_site: default_platform_site(),
            image_page_size: default_image_page_size(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SearchConfig {
    /// Fails with the name of the first missing credential.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        require("search.api_key", &self.api_key)?;
        require("search.engine_id", &self.engine_id)
    }
}

fn default_search_api_base() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_platform_site() -> String {
    "twitter.com".to_string()
}

fn default_image_page_size() -> u32 {
    7
}

fn default_timeout() -> u32 {
    30
}

/// Social posting provider configuration (X / Twitter, OAuth 1.0a).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
    /// Base URL for the v2 posting API.
    #[serde(default = "default_publisher_api_base")]
    pub api_base: String,
    /// Base URL for the v1.1 media upload API.
    #[serde(default = "default_upload_base")]
    pub upload_base: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            access_token: String::new(),
            access_secret: String::new(),
            api_base: default_publisher_api_base(),
            upload_base: default_upload_base(),
            timeout_secs: default_timeout(),
        }
    }
}

impl PublisherConfig {
    /// The 4-part credential set, or the name of the first missing part.
    pub fn credentials(&self) -> Result<OAuthCredentials, ConfigError> {
        require("publisher.api_key", &self.api_key)?;
        require("publisher.api_secret", &self.api_secret)?;
        require("publisher.access_token", &self.access_token)?;
        require("publisher.access_secret", &self.access_secret)?;
        Ok(OAuthCredentials {
            consumer_key: self.api_key.clone(),
            consumer_secret: self.api_secret.clone(),
            access_token: self.access_token.clone(),
            access_secret: self.access_secret.clone(),
        })
    }
}

fn default_publisher_api_base() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_upload_base() -> String {
    "https://upload.twitter.com/1.1".to_string()
}

pub(crate) fn require(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingCredential(name.to_string()))
    } else {
        Ok(())
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SanitizedSearchConfig,
    pub llm: SanitizedLlmConfig,
    pub publisher: SanitizedPublisherConfig,
    pub images: ImagePoolConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub api_base: String,
    pub platform_site: String,
    pub image_page_size: u32,
    pub api_key_configured: bool,
    pub engine_id_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPublisherConfig {
    pub api_base: String,
    pub upload_base: String,
    pub credentials_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            search: SanitizedSearchConfig {
                api_base: config.search.api_base.clone(),
                platform_site: config.search.platform_site.clone(),
                image_page_size: config.search.image_page_size,
                api_key_configured: !config.search.api_key.is_empty(),
                engine_id_configured: !config.search.engine_id.is_empty(),
            },
            llm: SanitizedLlmConfig {
                provider: config.llm.provider.clone(),
                model: config.llm.model.clone(),
                api_base: config.llm.api_base.clone(),
                api_key_configured: config.llm.api_key.as_ref().is_some_and(|k| !k.is_empty()),
            },
            publisher: SanitizedPublisherConfig {
                api_base: config.publisher.api_base.clone(),
                upload_base: config.publisher.upload_base.clone(),
                credentials_configured: config.publisher.credentials().is_ok(),
            },
            images: config.images.clone(),
        }
    }
}
