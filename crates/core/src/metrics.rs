//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search aggregation (by variant and outcome)
//! - Draft generation (by mode and outcome)
//! - Image pool refreshes
//! - Publishing (posts, media uploads)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search
// =============================================================================

/// Search calls by variant and result.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("postwright_searches_total", "Total search aggregations"),
        &["variant", "result"], // variant: "simple", "combined", "images"
    )
    .unwrap()
});

// =============================================================================
// Generation
// =============================================================================

/// Generation attempts by mode and result.
pub static GENERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("postwright_generations_total", "Total draft generations"),
        &["mode", "result"], // result: "success", "invalid", "failed"
    )
    .unwrap()
});

// =============================================================================
// Images
// =============================================================================

/// Image pool refreshes by result.
pub static IMAGE_REFRESHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "postwright_image_refreshes_total",
            "Total image candidate refreshes",
        ),
        &["result"], // "default", "custom", "quota_exceeded", "failed"
    )
    .unwrap()
});

// =============================================================================
// Publishing
// =============================================================================

/// Posts created on the remote platform.
pub static POSTS_PUBLISHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("postwright_posts_published_total", "Total posts published").unwrap()
});

/// Posts that failed to publish.
pub static POSTS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "postwright_posts_failed_total",
        "Total posts that failed to publish",
    )
    .unwrap()
});

/// Media uploads by result.
pub static MEDIA_UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("postwright_media_uploads_total", "Total media uploads"),
        &["result"],
    )
    .unwrap()
});

/// Whole publish calls by kind ("post", "thread") and duration.
pub static PUBLISH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "postwright_publish_duration_seconds",
            "Duration of a publish call",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["kind", "result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(GENERATIONS_TOTAL.clone()),
        Box::new(IMAGE_REFRESHES_TOTAL.clone()),
        Box::new(POSTS_PUBLISHED.clone()),
        Box::new(POSTS_FAILED.clone()),
        Box::new(MEDIA_UPLOADS.clone()),
        Box::new(PUBLISH_DURATION.clone()),
    ]
}
