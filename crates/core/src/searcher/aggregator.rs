//! Fan-out search over general, platform-scoped and image lookups.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::ranker::{query_terms, RelevanceRanker};
use super::{
    CombinedSearchResult, LookupStage, ProviderHit, ResultItem, SearchError, SearchProvider,
    SimpleSearchResult, SourceTag,
};
use crate::metrics::SEARCHES_TOTAL;

/// Start offset used by the aggregated image lookup.
const FIRST_PAGE: u32 = 1;

/// Merges provider lookups into tagged, ranked result sets.
pub struct SearchAggregator {
    provider: Arc<dyn SearchProvider>,
    platform_site: String,
}

impl SearchAggregator {
    pub fn new(provider: Arc<dyn SearchProvider>, platform_site: impl Into<String>) -> Self {
        Self {
            provider,
            platform_site: platform_site.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Query rewritten to the platform's site scope.
    pub fn platform_query(&self, query: &str) -> String {
        format!("site:{} {}", self.platform_site, query)
    }

    /// Simple variant: general web results merged with the shared image set.
    /// Results keep provider order and are not ranked.
    pub async fn search_simple(&self, query: &str) -> Result<SimpleSearchResult, SearchError> {
        let query = non_empty(query)?;

        let outcome = futures::try_join!(
            self.provider.web_search(query),
            self.provider.image_search(query, FIRST_PAGE),
        );
        let (web, images) = record_outcome("simple", outcome)?;

        let mut ids = IdAllocator::default();
        let items = tag_hits(web, SourceTag::General, &images, &mut ids);

        debug!(query = %query, items = items.len(), images = images.len(), "Simple search complete");
        Ok(SimpleSearchResult { items, images })
    }

    /// Combined variant: general and platform results merged and ranked,
    /// with the platform results also listed on their own.
    pub async fn search_combined(&self, query: &str) -> Result<CombinedSearchResult, SearchError> {
        let start = Instant::now();
        let query = non_empty(query)?;
        let platform_query = self.platform_query(query);

        debug!(
            provider = self.provider.name(),
            query = %query,
            "Starting parallel search"
        );

        let outcome = futures::try_join!(
            self.provider.web_search(query),
            async {
                self.provider
                    .web_search(&platform_query)
                    .await
                    .map_err(|e| e.at_stage(LookupStage::Platform))
            },
            self.provider.image_search(query, FIRST_PAGE),
        );
        let (web, platform, images) = record_outcome("combined", outcome)?;

        let mut ids = IdAllocator::default();
        let mut merged = tag_hits(web, SourceTag::General, &images, &mut ids);
        merged.extend(tag_hits(platform, SourceTag::PlatformSpecific, &images, &mut ids));

        let results = RelevanceRanker::rank(merged, &query_terms(query));
        let platform = results
            .items()
            .filter(|item| item.source_tag == SourceTag::PlatformSpecific)
            .cloned()
            .collect();

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            results = results.len(),
            duration_ms = duration_ms,
            "Combined search complete"
        );

        Ok(CombinedSearchResult {
            results,
            platform,
            images,
            duration_ms,
        })
    }

    /// Single image page for `query` starting at `start`.
    pub async fn search_images(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError> {
        let query = non_empty(query)?;
        let outcome = self.provider.image_search(query, start.max(FIRST_PAGE)).await;
        record_outcome("images", outcome)
    }
}

fn non_empty(query: &str) -> Result<&str, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        Err(SearchError::EmptyQuery)
    } else {
        Ok(query)
    }
}

fn record_outcome<T>(variant: &str, outcome: Result<T, SearchError>) -> Result<T, SearchError> {
    match &outcome {
        Ok(_) => SEARCHES_TOTAL.with_label_values(&[variant, "success"]).inc(),
        Err(e) => {
            warn!(variant = variant, error = %e, "Search failed");
            SEARCHES_TOTAL.with_label_values(&[variant, "failed"]).inc();
        }
    }
    outcome
}

fn tag_hits(
    hits: Vec<ProviderHit>,
    tag: SourceTag,
    images: &[String],
    ids: &mut IdAllocator,
) -> Vec<ResultItem> {
    let prefix = match tag {
        SourceTag::General => "result",
        SourceTag::PlatformSpecific => "platform",
    };
    hits.into_iter()
        .enumerate()
        .map(|(index, hit)| ResultItem {
            id: ids.allocate(hit.cache_id, prefix, index),
            title: hit.title,
            snippet: hit.snippet,
            link: hit.link,
            images: images.to_vec(),
            source_tag: tag,
        })
        .collect()
}

/// Hands out ids that are unique within one response.
#[derive(Default)]
struct IdAllocator {
    seen: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, preferred: Option<String>, prefix: &str, index: usize) -> String {
        if let Some(id) = preferred.filter(|id| !id.is_empty()) {
            if self.seen.insert(id.clone()) {
                return id;
            }
        }

        let mut candidate = format!("{}-{}", prefix, index);
        let mut suffix = 1;
        while !self.seen.insert(candidate.clone()) {
            candidate = format!("{}-{}-{}", prefix, index, suffix);
            suffix += 1;
        }
        candidate
    }
}
