//! Custom error types for the profile service HTTP layer

use axum::{
    Json,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::service::ProfileError;

/// Custom error type for the profile service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Body that is not valid JSON for the target payload
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    /// User id in the path that is not a valid identifier
    #[error(transparent)]
    InvalidPath(#[from] PathRejection),

    #[error(transparent)]
    InvalidMultipart(#[from] MultipartRejection),

    /// Failure reported by a profile operation
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidBody(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            ApiError::InvalidPath(rejection) => match rejection {
                PathRejection::FailedToDeserializePathParams(err) => {
                    debug!("Rejected request path: {}", err.body_text());
                    (StatusCode::BAD_REQUEST, "Invalid user ID".to_string())
                }
                other => {
                    error!("Path extraction failed: {}", other.body_text());
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::InvalidMultipart(rejection) => {
                debug!("Rejected multipart body: {}", rejection.body_text());
                (StatusCode::BAD_REQUEST, "Invalid multipart body".to_string())
            }
            ApiError::Profile(err) => match err {
                ProfileError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                ProfileError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                ProfileError::Storage(e) => {
                    error!("Storage failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
                ProfileError::Messaging(e) => {
                    error!("Event publication failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to publish event".to_string(),
                    )
                }
                ProfileError::ObjectStorage(e) => {
                    error!("Object storage failure: {:#}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Photo storage error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
