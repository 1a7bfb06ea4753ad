//! Character budget and post-count rules.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

use super::PostDraft;

/// Per-post character budget.
pub const MAX_POST_LENGTH: usize = 280;

/// Fixed cost of any URL, whatever its literal length.
pub const URL_WEIGHT: usize = 23;

/// Number of posts in a generated thread.
pub const THREAD_LENGTH: usize = 7;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Post is empty")]
    Empty,

    #[error("Post is {length} characters, limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("Expected exactly {expected} posts, got {actual}")]
    WrongPostCount { expected: usize, actual: usize },

    #[error("Post {position}: {source}")]
    InvalidPost {
        position: usize,
        #[source]
        source: Box<DraftError>,
    },

    #[error("Nothing to publish")]
    NoPosts,
}

/// Length of `text` with every URL counted as `URL_WEIGHT` characters.
pub fn normalized_length(text: &str) -> usize {
    let mut length = 0;
    let mut last = 0;
    for url in URL_PATTERN.find_iter(text) {
        length += text[last..url.start()].chars().count() + URL_WEIGHT;
        last = url.end();
    }
    length + text[last..].chars().count()
}

/// Validation entry points for single posts and threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftValidator;

impl DraftValidator {
    /// Budget check only. Empty text passes.
    pub fn check_budget(text: &str) -> Result<usize, DraftError> {
        let length = normalized_length(text);
        if length > MAX_POST_LENGTH {
            return Err(DraftError::TooLong {
                length,
                limit: MAX_POST_LENGTH,
            });
        }
        Ok(length)
    }

    /// A single post is valid iff it is non-empty after trimming and within
    /// the budget.
    pub fn validate_post(text: &str) -> Result<(), DraftError> {
        if text.trim().is_empty() {
            return Err(DraftError::Empty);
        }
        Self::check_budget(text).map(|_| ())
    }

    /// A generated thread is valid iff it has exactly `THREAD_LENGTH` posts
    /// and every post is valid on its own.
    pub fn validate_thread<S: AsRef<str>>(posts: &[S]) -> Result<(), DraftError> {
        if posts.len() != THREAD_LENGTH {
            return Err(DraftError::WrongPostCount {
                expected: THREAD_LENGTH,
                actual: posts.len(),
            });
        }
        Self::validate_each(posts.iter().map(AsRef::as_ref))
    }

    /// Pre-publish check over a composed sequence of any non-zero length.
    pub fn validate_for_publish(drafts: &[PostDraft]) -> Result<(), DraftError> {
        if drafts.is_empty() {
            return Err(DraftError::NoPosts);
        }
        Self::validate_each(drafts.iter().map(|d| d.text.as_str()))
    }

    fn validate_each<'a>(posts: impl Iterator<Item = &'a str>) -> Result<(), DraftError> {
        for (index, text) in posts.enumerate() {
            Self::validate_post(text).map_err(|e| DraftError::InvalidPost {
                position: index + 1,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_length() {
        assert_eq!(normalized_length("hello"), 5);
        assert_eq!(normalized_length(""), 0);
    }

    #[test]
    fn test_url_counts_as_fixed_weight() {
        assert_eq!(normalized_length("https://x.co/abc hello"), 23 + 6);
        let long = format!("https://example.com/{}", "a".repeat(200));
        assert_eq!(normalized_length(&long), 23);
    }

    #[test]
    fn test_multiple_urls_and_http() {
        let text = "see http://a.io and https://b.io/very/long/path?q=1";
        // "see " + url + " and " + url
        assert_eq!(normalized_length(text), 4 + 23 + 5 + 23);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(normalized_length("héllo ✨"), 7);
    }

    #[test]
    fn test_validate_post_rules() {
        assert_eq!(DraftValidator::validate_post("   "), Err(DraftError::Empty));
        assert!(DraftValidator::validate_post(&"a".repeat(280)).is_ok());
        assert_eq!(
            DraftValidator::validate_post(&"a".repeat(281)),
            Err(DraftError::TooLong {
                length: 281,
                limit: 280
            })
        );
    }

    #[test]
    fn test_long_url_fits_when_normalized() {
        let text = format!("{} https://example.com/{}", "a".repeat(256), "b".repeat(100));
        assert_eq!(normalized_length(&text), 280);
        assert!(DraftValidator::validate_post(&text).is_ok());
    }

    #[test]
    fn test_check_budget_allows_empty() {
        assert_eq!(DraftValidator::check_budget(""), Ok(0));
    }

    #[test]
    fn test_thread_requires_exactly_seven() {
        for count in [0, 1, 6, 8, 12] {
            let posts = vec!["post"; count];
            assert_eq!(
                DraftValidator::validate_thread(&posts),
                Err(DraftError::WrongPostCount {
                    expected: 7,
                    actual: count
                })
            );
        }
        assert!(DraftValidator::validate_thread(&vec!["post"; 7]).is_ok());
    }

    #[test]
    fn test_thread_rejects_invalid_member() {
        let mut posts = vec!["fine".to_string(); 7];
        posts[4] = "x".repeat(300);
        let err = DraftValidator::validate_thread(&posts).unwrap_err();
        assert!(matches!(err, DraftError::InvalidPost { position: 5, .. }));
    }

    #[test]
    fn test_validate_for_publish() {
        assert_eq!(
            DraftValidator::validate_for_publish(&[]),
            Err(DraftError::NoPosts)
        );
        let drafts = vec![PostDraft::new("one"), PostDraft::new("")];
        assert!(matches!(
            DraftValidator::validate_for_publish(&drafts),
            Err(DraftError::InvalidPost { position: 2, .. })
        ));
    }
}
