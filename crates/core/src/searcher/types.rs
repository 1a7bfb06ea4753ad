//! Types for the search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which lookup a result came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    General,
    PlatformSpecific,
}

/// A merged search result. Immutable once produced by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    /// Unique within one aggregated response.
    pub id: String,
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Shared image set of the whole response (not source-specific).
    pub images: Vec<String>,
    pub source_tag: SourceTag,
}

impl ResultItem {
    /// Text handed to the generator when this result is selected.
    pub fn source_text(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.title, self.snippet, self.link)
    }
}

/// A ranked result together with the score it was ranked by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub item: ResultItem,
    pub score: f64,
}

/// Results in ranking order. The order is fixed at aggregation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankedResultSet {
    pub entries: Vec<RankedEntry>,
}

/// Display filter over a ranked result set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultFilter {
    #[default]
    All,
    General,
    Platform,
}

/// Display order over a ranked result set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultSort {
    #[default]
    Relevance,
    PlatformFirst,
    GeneralFirst,
}

impl RankedResultSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &ResultItem> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn top(&self) -> Option<&ResultItem> {
        self.entries.first().map(|e| &e.item)
    }

    pub fn find(&self, id: &str) -> Option<&ResultItem> {
        self.items().find(|item| item.id == id)
    }

    /// Presentation view. Never reorders or rescores the set itself.
    pub fn view(&self, filter: ResultFilter, sort: ResultSort) -> Vec<&RankedEntry> {
        let mut view: Vec<&RankedEntry> = self
            .entries
            .iter()
            .filter(|e| match filter {
                ResultFilter::All => true,
                ResultFilter::General => e.item.source_tag == SourceTag::General,
                ResultFilter::Platform => e.item.source_tag == SourceTag::PlatformSpecific,
            })
            .collect();

        let platform_rank = |e: &&RankedEntry| match e.item.source_tag {
            SourceTag::PlatformSpecific => 0,
            SourceTag::General => 1,
        };
        match sort {
            ResultSort::Relevance => {}
            ResultSort::PlatformFirst => view.sort_by_key(platform_rank),
            ResultSort::GeneralFirst => view.sort_by_key(|e| 1 - platform_rank(e)),
        }
        view
    }
}

/// Response of the simple (web + images) search variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleSearchResult {
    pub items: Vec<ResultItem>,
    pub images: Vec<String>,
}

/// Response of the combined (web + platform + images, ranked) variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSearchResult {
    pub results: RankedResultSet,
    /// Platform-tagged results in ranking order, for separate display.
    pub platform: Vec<ResultItem>,
    pub images: Vec<String>,
    pub duration_ms: u64,
}

/// Raw hit from a provider web lookup, before tagging.
#[derive(Debug, Clone, Default)]
pub struct ProviderHit {
    pub cache_id: Option<String>,
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Lookup stage, used to name the failing stage in errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LookupStage {
    Web,
    Platform,
    Images,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupStage::Web => "web search",
            LookupStage::Platform => "platform search",
            LookupStage::Images => "image search",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("{stage} failed: {message}")]
    Upstream { stage: LookupStage, message: String },

    #[error("{stage} timed out")]
    Timeout { stage: LookupStage },

    #[error("{stage} returned an unreadable response: {message}")]
    InvalidResponse { stage: LookupStage, message: String },
}

impl SearchError {
    pub fn upstream(stage: LookupStage, message: impl Into<String>) -> Self {
        SearchError::Upstream {
            stage,
            message: message.into(),
        }
    }

    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<LookupStage> {
        match self {
            SearchError::EmptyQuery => None,
            SearchError::Upstream { stage, .. }
            | SearchError::Timeout { stage }
            | SearchError::InvalidResponse { stage, .. } => Some(*stage),
        }
    }

    /// Re-attribute the error to another stage.
    pub fn at_stage(self, new_stage: LookupStage) -> Self {
        match self {
            SearchError::EmptyQuery => SearchError::EmptyQuery,
            SearchError::Upstream { message, .. } => SearchError::Upstream {
                stage: new_stage,
                message,
            },
            SearchError::Timeout { .. } => SearchError::Timeout { stage: new_stage },
            SearchError::InvalidResponse { message, .. } => SearchError::InvalidResponse {
                stage: new_stage,
                message,
            },
        }
    }
}

/// Trait for search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// General web lookup.
    async fn web_search(&self, query: &str) -> Result<Vec<ProviderHit>, SearchError>;

    /// Image lookup returning image URLs. `start` is the 1-based offset of
    /// the first result.
    async fn image_search(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, tag: SourceTag, score: f64) -> RankedEntry {
        RankedEntry {
            item: ResultItem {
                id: id.to_string(),
                title: format!("title {}", id),
                snippet: String::new(),
                link: format!("https://example.com/{}", id),
                images: vec![],
                source_tag: tag,
            },
            score,
        }
    }

    fn sample_set() -> RankedResultSet {
        RankedResultSet {
            entries: vec![
                entry("a", SourceTag::General, 3.0),
                entry("b", SourceTag::PlatformSpecific, 2.5),
                entry("c", SourceTag::General, 1.0),
                entry("d", SourceTag::PlatformSpecific, 0.0),
            ],
        }
    }

    fn ids(view: &[&RankedEntry]) -> Vec<String> {
        view.iter().map(|e| e.item.id.clone()).collect()
    }

    #[test]
    fn test_source_text_layout() {
        let item = entry("x", SourceTag::General, 0.0).item;
        assert_eq!(
            item.source_text(),
            "title x\n\n\n\nhttps://example.com/x"
        );
    }

    #[test]
    fn test_view_filters_by_source() {
        let set = sample_set();
        assert_eq!(
            ids(&set.view(ResultFilter::Platform, ResultSort::Relevance)),
            vec!["b", "d"]
        );
        assert_eq!(
            ids(&set.view(ResultFilter::General, ResultSort::Relevance)),
            vec!["a", "c"]
        );
    }

    #[test]
    fn test_view_sort_keeps_ranking_within_groups() {
        let set = sample_set();
        assert_eq!(
            ids(&set.view(ResultFilter::All, ResultSort::PlatformFirst)),
            vec!["b", "d", "a", "c"]
        );
        assert_eq!(
            ids(&set.view(ResultFilter::All, ResultSort::GeneralFirst)),
            vec!["a", "c", "b", "d"]
        );
    }

    #[test]
    fn test_view_does_not_mutate_set() {
        let set = sample_set();
        let before = set.clone();
        let _ = set.view(ResultFilter::Platform, ResultSort::PlatformFirst);
        assert_eq!(set, before);
    }

    #[test]
    fn test_ranked_entry_serializes_flat() {
        let json = serde_json::to_value(entry("a", SourceTag::PlatformSpecific, 2.0)).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["sourceTag"], "platform_specific");
        assert_eq!(json["score"], 2.0);
    }

    #[test]
    fn test_error_stage_reattribution() {
        let err = SearchError::upstream(LookupStage::Web, "HTTP 403").at_stage(LookupStage::Platform);
        assert_eq!(err.stage(), Some(LookupStage::Platform));
        assert_eq!(err.to_string(), "platform search failed: HTTP 403");
    }
}
