//! Search API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use postwright_core::searcher::{RankedEntry, ResultFilter, ResultSort};
use postwright_core::{ResultItem, SimpleSearchResult};

use super::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SimpleSearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_term: String,
    #[serde(default)]
    pub filter: ResultFilter,
    #[serde(default)]
    pub sort: ResultSort,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<RankedEntry>,
    pub platform: Vec<ResultItem>,
    pub images: Vec<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchRequest {
    pub search_term: String,
    #[serde(default)]
    pub start: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ImageSearchResponse {
    pub images: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search?q=
///
/// Simple variant: general web results with the shared image set, unranked.
pub async fn search_simple(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimpleSearchParams>,
) -> Result<Json<SimpleSearchResult>, ApiError> {
    let query = params
        .q
        .ok_or_else(|| ApiError::bad_request("Query parameter is required"))?;
    let result = state.search()?.search_simple(&query).await?;
    Ok(Json(result))
}

/// POST /api/v1/search
///
/// Combined variant: general and platform results merged and ranked. The
/// result set becomes the session's current results.
pub async fn search_combined(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let result = state.search()?.search_combined(&body.search_term).await?;

    let response = SearchResponse {
        results: result
            .results
            .view(body.filter, body.sort)
            .into_iter()
            .cloned()
            .collect(),
        platform: result.platform.clone(),
        images: result.images.clone(),
        duration_ms: result.duration_ms,
    };

    let mut session = state.session().await;
    session.query = Some(body.search_term.trim().to_string());
    session.results = Some(result);

    Ok(Json(response))
}

/// POST /api/v1/search/images
///
/// One page of images; `start` is the 1-based result offset.
pub async fn search_images(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageSearchRequest>,
) -> Result<Json<ImageSearchResponse>, ApiError> {
    let images = state
        .search()?
        .search_images(&body.search_term, body.start.unwrap_or(1))
        .await?;
    Ok(Json(ImageSearchResponse { images }))
}
