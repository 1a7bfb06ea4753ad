//! Local asset upload.

use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::debug;

use postwright_core::publisher::{to_data_uri, DEFAULT_MEDIA_TYPE};

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/v1/assets
///
/// Accepts a multipart `file` field and returns it as a `data:` URI. Nothing
/// is stored server-side.
pub async fn upload_asset(mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let mime = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        debug!(mime = %mime, bytes = bytes.len(), "Asset uploaded");
        return Ok(Json(UploadResponse {
            url: to_data_uri(&mime, &bytes),
        }));
    }

    Err(ApiError::bad_request("No file provided"))
}
