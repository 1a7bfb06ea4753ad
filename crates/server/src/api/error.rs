//! Error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use postwright_core::{
    ComposeError, DraftError, GenerationError, ImagePoolError, PublishError, PublishRecord,
    SearchError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Set when re-sending the same request may succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    /// Posts already live when a publish failed part-way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PublishRecord>>,
}

/// A status code plus the JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                details: None,
                retryable: None,
                posts: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Missing credentials or an unwired provider.
    pub fn configuration(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    fn retryable(mut self, retryable: bool) -> Self {
        self.body.retryable = Some(retryable);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.body.error, details = ?self.body.details, "Request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::EmptyQuery => ApiError::bad_request(e.to_string()),
            _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Search failed")
                .with_details(e.to_string()),
        }
    }
}

impl From<DraftError> for ApiError {
    fn from(e: DraftError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::EmptySource => ApiError::bad_request(e.to_string()),
            _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate content")
                .with_details(e.to_string())
                .retryable(e.is_retryable()),
        }
    }
}

impl From<ImagePoolError> for ApiError {
    fn from(e: ImagePoolError) -> Self {
        match e {
            ImagePoolError::QuotaExceeded { .. } => {
                ApiError::new(StatusCode::CONFLICT, e.to_string())
            }
            ImagePoolError::UnknownPosition(_) => ApiError::not_found(e.to_string()),
            ImagePoolError::NoQuery => ApiError::bad_request(e.to_string()),
            ImagePoolError::Search(e) => e.into(),
        }
    }
}

impl From<ComposeError> for ApiError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::Validation(e) => e.into(),
            ComposeError::UnknownPosition(_) => ApiError::not_found(e.to_string()),
            ComposeError::UnknownImage { .. } | ComposeError::LastDraft => {
                ApiError::bad_request(e.to_string())
            }
            ComposeError::Images(e) => e.into(),
        }
    }
}

impl From<PublishError> for ApiError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Invalid(e) => e.into(),
            PublishError::Aborted {
                position,
                completed,
                source,
            } => {
                let mut error = ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to publish post {}", position),
                )
                .with_details(source.to_string());
                error.body.posts = Some(completed);
                error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postwright_core::searcher::LookupStage;
    use postwright_core::PublisherError;

    #[test]
    fn test_status_mapping() {
        let quota: ApiError = ImagePoolError::QuotaExceeded {
            position: 2,
            limit: 3,
        }
        .into();
        assert_eq!(quota.status, StatusCode::CONFLICT);

        let unknown: ApiError = ComposeError::UnknownPosition(9).into();
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);

        let too_long: ApiError = ComposeError::Validation(DraftError::TooLong {
            length: 300,
            limit: 280,
        })
        .into();
        assert_eq!(too_long.status, StatusCode::BAD_REQUEST);

        let upstream: ApiError =
            SearchError::upstream(LookupStage::Platform, "HTTP 500").into();
        assert_eq!(upstream.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(upstream.body.details.unwrap().contains("platform search"));
    }

    #[test]
    fn test_generation_errors_flag_retryable() {
        let err: ApiError = GenerationError::InvalidThreadCount {
            expected: 7,
            actual: 5,
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.retryable, Some(true));
    }

    #[test]
    fn test_aborted_publish_carries_posts() {
        let err: ApiError = PublishError::Aborted {
            position: 2,
            completed: vec![PublishRecord {
                remote_id: "1".to_string(),
                reply_to_id: None,
                media_id: None,
                text: "first".to_string(),
            }],
            source: PublisherError::Http("connection reset".to_string()),
        }
        .into();

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["error"], "Failed to publish post 2");
        assert_eq!(json["posts"][0]["remoteId"], "1");
        assert!(json.get("retryable").is_none());
    }
}
