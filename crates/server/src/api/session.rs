//! Composition session API handlers.
//!
//! The session holds the last combined search and a `ThreadComposer`. All
//! positions in paths are 1-based.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use postwright_core::{DraftMode, PublishRecord, ResultItem, ThreadSnapshot};

use super::ApiError;
use crate::state::{AppState, ComposeSession};

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub query: Option<String>,
    pub mode: Option<DraftMode>,
    pub selected: Option<ResultItem>,
    pub result_count: usize,
    #[serde(flatten)]
    pub thread: ThreadSnapshot,
}

impl SessionResponse {
    fn from_session(session: &ComposeSession) -> Self {
        Self {
            query: session.query.clone(),
            mode: session.mode,
            selected: session.selected.clone(),
            result_count: session.results.as_ref().map_or(0, |r| r.results.len()),
            thread: session.composer.snapshot(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGenerateRequest {
    /// Result to generate from; the top-ranked result when absent.
    #[serde(default)]
    pub result_id: Option<String>,
    pub mode: DraftMode,
}

#[derive(Debug, Deserialize)]
pub struct SetTextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectImageRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SelectImageResponse {
    pub selected: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCandidateRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub position: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshImagesRequest {
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshImagesResponse {
    /// Images returned by the lookup.
    pub fetched: Vec<String>,
    #[serde(flatten)]
    pub thread: ThreadSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SessionPublishResponse {
    pub success: bool,
    pub posts: Vec<PublishRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/session
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let session = state.session().await;
    Json(SessionResponse::from_session(&session))
}

/// POST /api/v1/session/generate
///
/// Generates from a result of the last combined search and loads the drafts
/// into the composer, seeding every position with the result images.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionGenerateRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let generator = state.generator()?;

    // The lock is not held across the completion call.
    let item = {
        let session = state.session().await;
        let results = session
            .results
            .as_ref()
            .ok_or_else(|| ApiError::bad_request("No search results in session"))?;
        let item = match body.result_id.as_deref() {
            Some(id) => results.results.find(id),
            None => results.results.top(),
        };
        item.cloned().ok_or_else(|| match body.result_id.as_deref() {
            Some(id) => ApiError::not_found(format!("Result not found: {}", id)),
            None => ApiError::bad_request("Search returned no results"),
        })?
    };

    let drafts = generator.generate(&item.source_text(), body.mode).await?;

    let mut session = state.session().await;
    session
        .composer
        .load(drafts, &item.images, Some(item.title.clone()))?;
    session.mode = Some(body.mode);
    session.selected = Some(item);
    info!(mode = body.mode.as_str(), drafts = session.composer.len(), "Session drafts generated");

    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/session/drafts
pub async fn insert_draft(State(state): State<Arc<AppState>>) -> Json<InsertResponse> {
    let mut session = state.session().await;
    let position = session.composer.insert();
    Json(InsertResponse { position })
}

/// DELETE /api/v1/session/drafts/{position}
pub async fn remove_draft(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
) -> Result<Json<ThreadSnapshot>, ApiError> {
    let mut session = state.session().await;
    session.composer.remove(position)?;
    Ok(Json(session.composer.snapshot()))
}

/// PUT /api/v1/session/drafts/{position}/text
pub async fn set_text(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    Json(body): Json<SetTextRequest>,
) -> Result<Json<ThreadSnapshot>, ApiError> {
    let mut session = state.session().await;
    session.composer.set_text(position, body.text)?;
    Ok(Json(session.composer.snapshot()))
}

/// POST /api/v1/session/drafts/{position}/image
///
/// Toggles the selection: selecting the current image clears it.
pub async fn select_image(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    Json(body): Json<SelectImageRequest>,
) -> Result<Json<SelectImageResponse>, ApiError> {
    let mut session = state.session().await;
    let selected = session
        .composer
        .select_image(position, &body.url)?
        .map(str::to_string);
    Ok(Json(SelectImageResponse { selected }))
}

/// POST /api/v1/session/drafts/{position}/candidates
pub async fn add_candidate(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
    Json(body): Json<AddCandidateRequest>,
) -> Result<Json<ThreadSnapshot>, ApiError> {
    if body.url.trim().is_empty() {
        return Err(ApiError::bad_request("url cannot be empty"));
    }
    let mut session = state.session().await;
    session.composer.add_candidate(position, body.url)?;
    Ok(Json(session.composer.snapshot()))
}

/// POST /api/v1/session/images/refresh
///
/// Refreshes one position, or all of them when `position` is absent. A
/// single-position refresh without `query` counts against that position's
/// quota; a whole-thread refresh leaves every counter untouched.
pub async fn refresh_images(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshImagesRequest>,
) -> Result<Json<RefreshImagesResponse>, ApiError> {
    let search = state.search()?;
    let mut session = state.session().await;
    let images = session
        .composer
        .refresh_images(search, body.position, body.query.as_deref())
        .await?;
    Ok(Json(RefreshImagesResponse {
        fetched: images,
        thread: session.composer.snapshot(),
    }))
}

/// POST /api/v1/session/publish
pub async fn publish(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionPublishResponse>, ApiError> {
    let pipeline = state.pipeline()?;
    let drafts = state.session().await.composer.drafts().to_vec();
    let posts = pipeline.publish(&drafts).await?;
    Ok(Json(SessionPublishResponse {
        success: true,
        posts,
    }))
}
