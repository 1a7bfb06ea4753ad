//! Per-position image candidates with a bounded refresh quota.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use super::ImagePoolConfig;
use crate::metrics::IMAGE_REFRESHES_TOTAL;
use crate::searcher::{SearchAggregator, SearchError};

/// Errors from image pool operations.
#[derive(Debug, thiserror::Error)]
pub enum ImagePoolError {
    #[error("Refresh limit of {limit} reached for position {position}; a custom query is required")]
    QuotaExceeded { position: usize, limit: u32 },

    #[error("No draft at position {0}")]
    UnknownPosition(usize),

    #[error("No image query available; a custom query is required")]
    NoQuery,

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Where refreshed image batches come from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// One page of image URLs for `query` starting at the 1-based `start`.
    async fn fetch_images(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError>;
}

#[async_trait]
impl ImageSource for SearchAggregator {
    async fn fetch_images(&self, query: &str, start: u32) -> Result<Vec<String>, SearchError> {
        self.search_images(query, start).await
    }
}

/// Candidates and refresh counter for one draft position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionImages {
    pub position: usize,
    pub candidates: Vec<String>,
    pub refresh_count: u32,
    pub refreshes_remaining: u32,
}

/// Candidate image URLs keyed by 1-based draft position, plus a refresh
/// counter per position.
///
/// Both maps always hold exactly the keys `1..=len()`. Removing a position
/// shifts every later key down by one.
#[derive(Debug, Clone, Default)]
pub struct ImageCandidatePool {
    config: ImagePoolConfig,
    default_query: Option<String>,
    pools: BTreeMap<usize, Vec<String>>,
    counters: BTreeMap<usize, u32>,
}

impl ImageCandidatePool {
    pub fn new(config: ImagePoolConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ImagePoolConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn default_query(&self) -> Option<&str> {
        self.default_query.as_deref()
    }

    /// Re-initialize for a new draft set: every position gets a copy of
    /// `initial` and a zero counter.
    pub fn reset(&mut self, positions: usize, initial: &[String], default_query: Option<String>) {
        self.default_query = default_query.filter(|q| !q.trim().is_empty());
        self.pools = (1..=positions).map(|p| (p, initial.to_vec())).collect();
        self.counters = (1..=positions).map(|p| (p, 0)).collect();
    }

    pub fn candidates(&self, position: usize) -> Option<&[String]> {
        self.pools.get(&position).map(Vec::as_slice)
    }

    pub fn refresh_count(&self, position: usize) -> Option<u32> {
        self.counters.get(&position).copied()
    }

    pub fn contains(&self, position: usize, url: &str) -> bool {
        self.pools
            .get(&position)
            .is_some_and(|pool| pool.iter().any(|u| u == url))
    }

    /// Snapshot of every position in order.
    pub fn positions(&self) -> Vec<PositionImages> {
        self.pools
            .iter()
            .map(|(&position, candidates)| {
                let refresh_count = self.counters.get(&position).copied().unwrap_or(0);
                PositionImages {
                    position,
                    candidates: candidates.clone(),
                    refresh_count,
                    refreshes_remaining: self.config.refresh_limit.saturating_sub(refresh_count),
                }
            })
            .collect()
    }

    /// Replace the candidates at `position` with a fresh batch.
    ///
    /// Without a custom query the position's quota applies: once the counter
    /// reaches the limit the call is refused before any lookup. A successful
    /// default refresh increments the counter; a successful custom-query
    /// refresh resets it to zero. Blank custom queries count as absent.
    pub async fn refresh(
        &mut self,
        source: &dyn ImageSource,
        position: usize,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>, ImagePoolError> {
        let count = self
            .refresh_count(position)
            .ok_or(ImagePoolError::UnknownPosition(position))?;
        let custom_query = custom_query.map(str::trim).filter(|q| !q.is_empty());

        if custom_query.is_none() && count >= self.config.refresh_limit {
            debug!(position = position, count = count, "Image refresh refused");
            IMAGE_REFRESHES_TOTAL
                .with_label_values(&["quota_exceeded"])
                .inc();
            return Err(ImagePoolError::QuotaExceeded {
                position,
                limit: self.config.refresh_limit,
            });
        }

        let query = match custom_query {
            Some(q) => q.to_string(),
            None => self.default_query.clone().ok_or(ImagePoolError::NoQuery)?,
        };
        let images = self.fetch(source, &query).await?;

        self.pools.insert(position, images.clone());
        let (label, next) = match custom_query {
            Some(_) => ("custom", 0),
            None => ("default", count + 1),
        };
        self.counters.insert(position, next);
        IMAGE_REFRESHES_TOTAL.with_label_values(&[label]).inc();

        debug!(
            position = position,
            query = %query,
            images = images.len(),
            refresh_count = next,
            "Image candidates refreshed"
        );
        Ok(images)
    }

    /// Fetch one batch and give it to every position. Counters are left
    /// untouched.
    pub async fn refresh_all(
        &mut self,
        source: &dyn ImageSource,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>, ImagePoolError> {
        let query = custom_query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_query.clone())
            .ok_or(ImagePoolError::NoQuery)?;
        let images = self.fetch(source, &query).await?;

        for pool in self.pools.values_mut() {
            *pool = images.clone();
        }
        IMAGE_REFRESHES_TOTAL.with_label_values(&["all"]).inc();
        debug!(query = %query, positions = self.pools.len(), "All image candidates refreshed");
        Ok(images)
    }

    /// Append `url` to the candidates at `position` unless already present.
    pub fn add_candidate(&mut self, position: usize, url: impl Into<String>) -> Result<(), ImagePoolError> {
        let pool = self
            .pools
            .get_mut(&position)
            .ok_or(ImagePoolError::UnknownPosition(position))?;
        let url = url.into();
        if !pool.contains(&url) {
            pool.push(url);
        }
        Ok(())
    }

    /// Add an empty position at the end. Returns its number.
    pub fn push_position(&mut self) -> usize {
        let position = self.pools.len() + 1;
        self.pools.insert(position, Vec::new());
        self.counters.insert(position, 0);
        position
    }

    /// Drop `position` and shift every later key down by one.
    pub fn remove_position(&mut self, position: usize) -> Result<(), ImagePoolError> {
        if !self.pools.contains_key(&position) {
            return Err(ImagePoolError::UnknownPosition(position));
        }
        self.pools = rekey_after_removal(std::mem::take(&mut self.pools), position);
        self.counters = rekey_after_removal(std::mem::take(&mut self.counters), position);
        Ok(())
    }

    async fn fetch(&self, source: &dyn ImageSource, query: &str) -> Result<Vec<String>, ImagePoolError> {
        let start = rand::thread_rng().gen_range(1..=self.config.max_random_offset.max(1));
        source.fetch_images(query, start).await.map_err(|e| {
            warn!(query = %query, start = start, error = %e, "Image refresh failed");
            IMAGE_REFRESHES_TOTAL.with_label_values(&["failed"]).inc();
            ImagePoolError::from(e)
        })
    }
}

fn rekey_after_removal<V>(map: BTreeMap<usize, V>, removed: usize) -> BTreeMap<usize, V> {
    map.into_iter()
        .filter(|(key, _)| *key != removed)
        .map(|(key, value)| if key > removed { (key - 1, value) } else { (key, value) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSearchProvider;
    use std::sync::Arc;

    fn urls(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://img.example/{prefix}{i}.jpg")).collect()
    }

    async fn source(images: Vec<String>) -> (Arc<MockSearchProvider>, SearchAggregator) {
        let provider = Arc::new(MockSearchProvider::new());
        provider.set_images(images).await;
        let aggregator = SearchAggregator::new(provider.clone(), "twitter.com");
        (provider, aggregator)
    }

    fn pool(positions: usize) -> ImageCandidatePool {
        let mut pool = ImageCandidatePool::new(ImagePoolConfig::default());
        pool.reset(positions, &urls("seed", 2), Some("Rust memory safety".to_string()));
        pool
    }

    #[test]
    fn test_reset_seeds_every_position() {
        let pool = pool(3);
        assert_eq!(pool.len(), 3);
        for position in 1..=3 {
            assert_eq!(pool.candidates(position).unwrap(), urls("seed", 2).as_slice());
            assert_eq!(pool.refresh_count(position), Some(0));
        }
        assert!(pool.candidates(4).is_none());
    }

    #[tokio::test]
    async fn test_fourth_default_refresh_is_refused() {
        let (provider, source) = source(urls("fresh", 7)).await;
        let mut pool = pool(1);

        for expected in 1..=3 {
            let images = pool.refresh(&source, 1, None).await.unwrap();
            assert_eq!(images, urls("fresh", 7));
            assert_eq!(pool.refresh_count(1), Some(expected));
        }

        let err = pool.refresh(&source, 1, None).await.unwrap_err();
        assert!(matches!(
            err,
            ImagePoolError::QuotaExceeded { position: 1, limit: 3 }
        ));
        assert_eq!(pool.refresh_count(1), Some(3));
        assert_eq!(provider.recorded_image_queries().await.len(), 3);
    }

    #[tokio::test]
    async fn test_custom_query_resets_quota() {
        let (provider, source) = source(urls("cat", 7)).await;
        let mut pool = pool(2);
        for _ in 0..3 {
            pool.refresh(&source, 1, None).await.unwrap();
        }

        pool.refresh(&source, 1, Some("  cute crabs ")).await.unwrap();
        assert_eq!(pool.refresh_count(1), Some(0));
        assert_eq!(pool.candidates(1).unwrap(), urls("cat", 7).as_slice());

        let queries = provider.recorded_image_queries().await;
        assert_eq!(queries.last().unwrap().0, "cute crabs");
        assert_eq!(queries[0].0, "Rust memory safety");

        pool.refresh(&source, 1, None).await.unwrap();
        assert_eq!(pool.refresh_count(1), Some(1));
    }

    #[tokio::test]
    async fn test_blank_custom_query_counts_as_absent() {
        let (_provider, source) = source(urls("x", 7)).await;
        let mut pool = pool(1);
        for _ in 0..3 {
            pool.refresh(&source, 1, Some("   ")).await.unwrap();
        }
        assert_eq!(pool.refresh_count(1), Some(3));
        assert!(matches!(
            pool.refresh(&source, 1, Some("")).await,
            Err(ImagePoolError::QuotaExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_offsets_are_random_and_one_based() {
        let (provider, source) = source(urls("x", 7)).await;
        let mut pool = pool(1);
        for _ in 0..20 {
            pool.refresh(&source, 1, Some("query")).await.unwrap();
        }
        for (_, start) in provider.recorded_image_queries().await {
            assert!((1..=50).contains(&start), "start {start} out of range");
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let (provider, source) = source(urls("x", 7)).await;
        provider
            .fail_images(SearchError::upstream(
                crate::searcher::LookupStage::Images,
                "quota",
            ))
            .await;
        let mut pool = pool(1);

        let err = pool.refresh(&source, 1, None).await.unwrap_err();
        assert!(matches!(err, ImagePoolError::Search(_)));
        assert_eq!(pool.refresh_count(1), Some(0));
        assert_eq!(pool.candidates(1).unwrap(), urls("seed", 2).as_slice());
    }

    #[tokio::test]
    async fn test_refresh_without_any_query() {
        let (_provider, source) = source(urls("x", 7)).await;
        let mut pool = ImageCandidatePool::new(ImagePoolConfig::default());
        pool.reset(1, &[], None);

        assert!(matches!(
            pool.refresh(&source, 1, None).await,
            Err(ImagePoolError::NoQuery)
        ));
        assert!(pool.refresh(&source, 1, Some("rust")).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_unknown_position() {
        let (_provider, source) = source(urls("x", 7)).await;
        let mut pool = pool(2);
        assert!(matches!(
            pool.refresh(&source, 3, None).await,
            Err(ImagePoolError::UnknownPosition(3))
        ));
    }

    #[tokio::test]
    async fn test_refresh_all_leaves_counters() {
        let (_provider, source) = source(urls("all", 7)).await;
        let mut pool = pool(3);
        pool.refresh(&source, 2, None).await.unwrap();

        pool.refresh_all(&source, None).await.unwrap();
        for position in 1..=3 {
            assert_eq!(pool.candidates(position).unwrap(), urls("all", 7).as_slice());
        }
        assert_eq!(pool.refresh_count(1), Some(0));
        assert_eq!(pool.refresh_count(2), Some(1));
    }

    #[test]
    fn test_remove_position_rekeys() {
        let mut pool = pool(4);
        pool.add_candidate(3, "https://img.example/third.jpg").unwrap();
        pool.counters.insert(3, 2);

        pool.remove_position(2).unwrap();

        assert_eq!(pool.len(), 3);
        assert!(pool.contains(2, "https://img.example/third.jpg"));
        assert_eq!(pool.refresh_count(2), Some(2));
        assert!(!pool.contains(3, "https://img.example/third.jpg"));
        assert!(pool.candidates(4).is_none());
        assert!(pool.refresh_count(4).is_none());
    }

    #[test]
    fn test_remove_unknown_position() {
        let mut pool = pool(2);
        assert!(matches!(
            pool.remove_position(5),
            Err(ImagePoolError::UnknownPosition(5))
        ));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_push_and_add_candidate() {
        let mut pool = pool(1);
        assert_eq!(pool.push_position(), 2);
        assert_eq!(pool.candidates(2).unwrap(), &[] as &[String]);

        pool.add_candidate(2, "data:image/png;base64,AAAA").unwrap();
        pool.add_candidate(2, "data:image/png;base64,AAAA").unwrap();
        assert_eq!(pool.candidates(2).unwrap().len(), 1);
        assert!(pool.add_candidate(9, "x").is_err());
    }

    #[test]
    fn test_positions_snapshot() {
        let mut pool = pool(2);
        pool.counters.insert(1, 3);
        let snapshot = pool.positions();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].refreshes_remaining, 0);
        assert_eq!(snapshot[1].refreshes_remaining, 3);
    }
}
