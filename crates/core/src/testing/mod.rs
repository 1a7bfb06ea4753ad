//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external service
//! trait, so search, generation and publishing can be exercised end to end
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use postwright_core::testing::{MockLlmClient, MockPublisher, MockSearchProvider};
//!
//! let provider = Arc::new(MockSearchProvider::new());
//! let llm = Arc::new(MockLlmClient::new());
//! let publisher = Arc::new(MockPublisher::new());
//!
//! // Configure mock responses
//! provider.set_web_hits(vec![fixtures::hit(None, "Rust", "memory safety")]).await;
//! llm.push_response(fixtures::thread_completion(7)).await;
//! publisher.fail_post_at(3).await;
//! ```

mod mock_llm;
mod mock_publisher;
mod mock_search;

pub use mock_llm::MockLlmClient;
pub use mock_publisher::{MockMediaFetcher, MockPublisher};
pub use mock_search::MockSearchProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::searcher::{ProviderHit, ResultItem, SourceTag};

    /// A provider hit with a derived link.
    pub fn hit(cache_id: Option<&str>, title: &str, snippet: &str) -> ProviderHit {
        ProviderHit {
            cache_id: cache_id.map(str::to_string),
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: format!(
                "https://example.com/{}",
                title.to_lowercase().replace(' ', "-")
            ),
        }
    }

    /// A general result item with no images.
    pub fn result_item(id: &str, title: &str, snippet: &str) -> ResultItem {
        ResultItem {
            id: id.to_string(),
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: format!("https://example.com/{}", id),
            images: Vec::new(),
            source_tag: SourceTag::General,
        }
    }

    /// A thread completion with `count` prefixed lines, wrapped in the
    /// chatter a model tends to add.
    pub fn thread_completion(count: usize) -> String {
        let mut lines = vec!["Here's your thread:".to_string(), String::new()];
        lines.extend((1..=count).map(|i| format!("Tweet: Post {} about the topic #rust", i)));
        lines.push(String::new());
        lines.push("Hope this helps!".to_string());
        lines.join("\n")
    }

    /// `count` image URLs.
    pub fn image_urls(prefix: &str, count: usize) -> Vec<String> {
        (1..=count)
            .map(|i| format!("https://img.example/{}-{}.jpg", prefix, i))
            .collect()
    }
}
