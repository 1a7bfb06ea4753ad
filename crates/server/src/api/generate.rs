//! Stateless generation API handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use postwright_core::{DraftMode, PostDraft};

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub source_text: String,
    pub mode: DraftMode,
}

/// A single post is returned as a string, a thread as a list of drafts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Single(String),
    Thread(Vec<PostDraft>),
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: GeneratedContent,
}

/// POST /api/v1/generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let generator = state.generator()?;

    let content = match body.mode {
        DraftMode::Single => {
            GeneratedContent::Single(generator.generate_single(&body.source_text).await?.text)
        }
        DraftMode::Thread => {
            GeneratedContent::Thread(generator.generate_thread(&body.source_text).await?)
        }
    };

    Ok(Json(GenerateResponse { content }))
}
