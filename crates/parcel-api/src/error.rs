//! Handler-level errors and their JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parcel_core::{defaults::IMAGE_FIELD, ErrorKind, EvidenceError};
use serde_json::{json, Value as JsonValue};

/// Errors a handler can return. Every variant renders as
/// `{error, message, ...details}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid tracking number format")]
    InvalidTrackingNumber(String),

    #[error("Tracking number not found")]
    TrackingNotFound(String),

    #[error("No image file provided")]
    MissingFile,

    /// Request body could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error("Endpoint not found")]
    RouteNotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable string rendered in the `error` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidTrackingNumber(_) => ErrorKind::InvalidTrackingNumber.as_str(),
            ApiError::TrackingNotFound(_) => ErrorKind::TrackingNotFound.as_str(),
            ApiError::MissingFile => ErrorKind::MissingFile.as_str(),
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Evidence(err) => err.kind().as_str(),
            ApiError::RouteNotFound => "not_found",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidTrackingNumber(_)
            | ApiError::MissingFile
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TrackingNotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Evidence(err) => match err.kind() {
                ErrorKind::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                // Delete failures share the delete endpoint's 404 contract.
                ErrorKind::EvidenceNotFound | ErrorKind::DeleteFailed => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error.
    pub fn body(&self) -> JsonValue {
        match self {
            ApiError::Evidence(err) => err.to_body(),
            ApiError::InvalidTrackingNumber(tracking_number)
            | ApiError::TrackingNotFound(tracking_number) => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "trackingNumber": tracking_number,
            }),
            ApiError::MissingFile => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "field": IMAGE_FIELD,
            }),
            _ => json!({
                "error": self.error_code(),
                "message": self.to_string(),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(subsystem = "api", error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
