//! Publishing API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use postwright_core::{PostDraft, PublishRecord};

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPostRequest {
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishThreadRequest {
    pub entries: Vec<PostDraft>,
}

#[derive(Debug, Serialize)]
pub struct PublishPostResponse {
    pub success: bool,
    pub post: PublishRecord,
}

#[derive(Debug, Serialize)]
pub struct PublishThreadResponse {
    pub success: bool,
    pub posts: Vec<PublishRecord>,
}

/// POST /api/v1/publish/post
pub async fn publish_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PublishPostRequest>,
) -> Result<Json<PublishPostResponse>, ApiError> {
    let post = state
        .pipeline()?
        .publish_one(&body.text, body.image_url.as_deref())
        .await?;
    Ok(Json(PublishPostResponse {
        success: true,
        post,
    }))
}

/// POST /api/v1/publish/thread
///
/// Stops at the first failing entry; the error body lists the posts that
/// are already live.
pub async fn publish_thread(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PublishThreadRequest>,
) -> Result<Json<PublishThreadResponse>, ApiError> {
    let posts = state.pipeline()?.publish(&body.entries).await?;
    Ok(Json(PublishThreadResponse {
        success: true,
        posts,
    }))
}
