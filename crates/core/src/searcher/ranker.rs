//! Relevance scoring for merged search results.

use super::{RankedEntry, RankedResultSet, ResultItem, SourceTag};

const PLATFORM_BONUS: f64 = 2.0;
const TITLE_TERM_WEIGHT: f64 = 1.0;
const SNIPPET_TERM_WEIGHT: f64 = 0.5;

/// Split a free-text query into lower-cased terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Scores and orders result items. Pure function of its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceRanker;

impl RelevanceRanker {
    /// Score one item against lower-cased query terms.
    ///
    /// Platform-tagged items get a fixed bonus; every term found in the
    /// title adds 1, every term found in the snippet adds 0.5.
    pub fn score(item: &ResultItem, terms: &[String]) -> f64 {
        let mut score = 0.0;
        if item.source_tag == SourceTag::PlatformSpecific {
            score += PLATFORM_BONUS;
        }

        let title = item.title.to_lowercase();
        let snippet = item.snippet.to_lowercase();
        for term in terms {
            if title.contains(term.as_str()) {
                score += TITLE_TERM_WEIGHT;
            }
            if snippet.contains(term.as_str()) {
                score += SNIPPET_TERM_WEIGHT;
            }
        }
        score
    }

    /// Order items by descending score. Equal scores keep input order.
    pub fn rank(items: Vec<ResultItem>, terms: &[String]) -> RankedResultSet {
        let mut entries: Vec<RankedEntry> = items
            .into_iter()
            .map(|item| {
                let score = Self::score(&item, terms);
                RankedEntry { item, score }
            })
            .collect();

        // sort_by is stable
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));

        RankedResultSet { entries }
    }
}
