//! Prometheus metrics for the HTTP server.
//!
//! HTTP request metrics live here; search, generation and publishing metrics
//! are defined in the core crate and registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "postwright_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("postwright_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "postwright_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Session Metrics (collected dynamically)
// =============================================================================

/// Drafts in the composition session.
pub static SESSION_DRAFTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "postwright_session_drafts",
        "Number of drafts in the composition session",
    )
    .unwrap()
});

/// Image refreshes left across all session positions.
pub static SESSION_REFRESHES_REMAINING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "postwright_session_refreshes_remaining",
        "Image refreshes remaining across all session positions",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Session
    registry
        .register(Box::new(SESSION_DRAFTS.clone()))
        .unwrap();
    registry
        .register(Box::new(SESSION_REFRESHES_REMAINING.clone()))
        .unwrap();

    // Core metrics (search, generation, publishing)
    for metric in postwright_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Update session gauges from the current application state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let session = state.session().await;
    SESSION_DRAFTS.set(session.composer.len() as i64);

    let remaining: u32 = session
        .composer
        .images()
        .positions()
        .iter()
        .map(|p| p.refreshes_remaining)
        .sum();
    SESSION_REFRESHES_REMAINING.set(i64::from(remaining));
}

static NUMERIC_SEGMENT: Lazy<regex_lite::Regex> =
    Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace draft positions with a
/// placeholder).
pub fn normalize_path(path: &str) -> String {
    NUMERIC_SEGMENT.replace_all(path, "/{position}$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_position() {
        assert_eq!(
            normalize_path("/api/v1/session/drafts/3/text"),
            "/api/v1/session/drafts/{position}/text"
        );
        assert_eq!(
            normalize_path("/api/v1/session/drafts/12"),
            "/api/v1/session/drafts/{position}"
        );
    }

    #[test]
    fn test_normalize_path_no_change() {
        assert_eq!(normalize_path("/api/v1/search"), "/api/v1/search");
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
    }

    #[test]
    fn test_encode_includes_core_metrics() {
        postwright_core::metrics::SEARCHES_TOTAL
            .with_label_values(&["combined", "success"])
            .inc();
        let output = encode_metrics();
        assert!(output.contains("postwright_searches_total"));
    }
}
