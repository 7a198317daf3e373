//! Error types for the parcel tracking service.
//!
//! Two layers live here:
//! - [`Error`] covers infrastructure failures (I/O, storage, bad storage paths).
//! - [`EvidenceError`] is the tagged, user-facing error produced by evidence
//!   validation and the evidence store. Every variant maps onto a stable
//!   [`ErrorKind`] string that is rendered on the wire.

use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::defaults::{ALLOWED_IMAGE_FORMATS, ALLOWED_MIME_TYPES};

/// Result type alias using the service's infrastructure [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for infrastructure operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// WIRE ERROR KINDS
// =============================================================================

/// Closed set of error kinds exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidTrackingNumber,
    TrackingNotFound,
    MissingFile,
    FileTooLarge,
    InvalidFile,
    InvalidImageFormat,
    InvalidImage,
    UploadFailed,
    DeleteFailed,
    EvidenceNotFound,
}

impl ErrorKind {
    /// Stable string rendered in the `error` field of response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidTrackingNumber => "invalid_tracking_number",
            Self::TrackingNotFound => "tracking_not_found",
            Self::MissingFile => "missing_file",
            Self::FileTooLarge => "file_too_large",
            Self::InvalidFile => "invalid_file",
            Self::InvalidImageFormat => "invalid_image_format",
            Self::InvalidImage => "invalid_image",
            Self::UploadFailed => "upload_failed",
            Self::DeleteFailed => "delete_failed",
            Self::EvidenceNotFound => "evidence_not_found",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// EVIDENCE ERRORS
// =============================================================================

/// Error produced while validating, saving, or deleting delivery evidence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvidenceError {
    /// Payload is larger than the configured upload cap.
    #[error("File size {actual_size} exceeds maximum allowed size of {max_size} bytes")]
    FileTooLarge { actual_size: u64, max_size: u64 },

    /// Declared MIME type is not one of the accepted image types.
    #[error("Invalid file format. Only JPEG, PNG, GIF, WebP are allowed")]
    InvalidFile { actual_type: String },

    /// Payload is an image, but not in an accepted format.
    #[error("Invalid image format")]
    InvalidImageFormat { actual_format: String },

    /// Payload could not be recognised as an image at all.
    #[error("File is not a valid image")]
    InvalidImage,

    /// Writing the file to storage failed.
    #[error("Failed to save evidence file")]
    UploadFailed { details: String },

    /// Removing the file from storage failed.
    #[error("Failed to delete evidence file")]
    DeleteFailed { details: String },

    /// Nothing has ever been uploaded for the tracking number.
    #[error("No evidence found for this tracking number")]
    NoEvidenceForTracking,

    /// The tracking number has evidence, but none with the requested id.
    #[error("Evidence with specified ID not found")]
    EvidenceNotFound,
}

impl EvidenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::InvalidFile { .. } => ErrorKind::InvalidFile,
            Self::InvalidImageFormat { .. } => ErrorKind::InvalidImageFormat,
            Self::InvalidImage => ErrorKind::InvalidImage,
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::DeleteFailed { .. } => ErrorKind::DeleteFailed,
            Self::NoEvidenceForTracking | Self::EvidenceNotFound => ErrorKind::EvidenceNotFound,
        }
    }

    /// Structured detail fields rendered alongside `error` and `message`.
    pub fn details(&self) -> Map<String, JsonValue> {
        let value = match self {
            Self::FileTooLarge {
                actual_size,
                max_size,
            } => json!({
                "maxSize": format_size_limit(*max_size),
                "actualSize": format!("{} bytes", actual_size),
            }),
            Self::InvalidFile { actual_type } => json!({
                "allowedTypes": ALLOWED_MIME_TYPES,
                "actualType": actual_type,
            }),
            Self::InvalidImageFormat { actual_format } => json!({
                "allowedFormats": ALLOWED_IMAGE_FORMATS,
                "actualFormat": actual_format,
            }),
            Self::UploadFailed { details } | Self::DeleteFailed { details } => json!({
                "details": details,
            }),
            Self::InvalidImage | Self::NoEvidenceForTracking | Self::EvidenceNotFound => {
                return Map::new()
            }
        };
        match value {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Full JSON body: `{error, message, ...details}`.
    pub fn to_body(&self) -> JsonValue {
        let mut body = Map::new();
        body.insert("error".into(), JsonValue::from(self.kind().as_str()));
        body.insert("message".into(), JsonValue::from(self.to_string()));
        body.extend(self.details());
        JsonValue::Object(body)
    }
}

/// Render an upload cap the way clients see it ("5MB" for whole mebibytes).
fn format_size_limit(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("storage path '../x' escapes".to_string());
        assert_eq!(err.to_string(), "Invalid input: storage path '../x' escapes");
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
        assert_send::<EvidenceError>();
        assert_sync::<EvidenceError>();
    }

    #[test]
    fn test_error_kind_strings_are_stable() {
        let expected = [
            (ErrorKind::InvalidTrackingNumber, "invalid_tracking_number"),
            (ErrorKind::TrackingNotFound, "tracking_not_found"),
            (ErrorKind::MissingFile, "missing_file"),
            (ErrorKind::FileTooLarge, "file_too_large"),
            (ErrorKind::InvalidFile, "invalid_file"),
            (ErrorKind::InvalidImageFormat, "invalid_image_format"),
            (ErrorKind::InvalidImage, "invalid_image"),
            (ErrorKind::UploadFailed, "upload_failed"),
            (ErrorKind::DeleteFailed, "delete_failed"),
            (ErrorKind::EvidenceNotFound, "evidence_not_found"),
        ];
        for (kind, s) in expected {
            assert_eq!(kind.as_str(), s);
            assert_eq!(kind.to_string(), s);
        }
    }

    #[test]
    fn test_both_not_found_variants_share_kind() {
        assert_eq!(
            EvidenceError::NoEvidenceForTracking.kind(),
            ErrorKind::EvidenceNotFound
        );
        assert_eq!(
            EvidenceError::EvidenceNotFound.kind(),
            ErrorKind::EvidenceNotFound
        );
        assert_ne!(
            EvidenceError::NoEvidenceForTracking.to_string(),
            EvidenceError::EvidenceNotFound.to_string()
        );
    }

    #[test]
    fn test_file_too_large_body() {
        let err = EvidenceError::FileTooLarge {
            actual_size: 6_291_456,
            max_size: 5_242_880,
        };
        let body = err.to_body();
        assert_eq!(body["error"], "file_too_large");
        assert_eq!(
            body["message"],
            "File size 6291456 exceeds maximum allowed size of 5242880 bytes"
        );
        assert_eq!(body["maxSize"], "5MB");
        assert_eq!(body["actualSize"], "6291456 bytes");
    }

    #[test]
    fn test_format_size_limit() {
        assert_eq!(format_size_limit(5 * 1024 * 1024), "5MB");
        assert_eq!(format_size_limit(1000), "1000 bytes");
    }

    #[test]
    fn test_invalid_file_body_lists_allowed_types() {
        let err = EvidenceError::InvalidFile {
            actual_type: "application/pdf".to_string(),
        };
        let body = err.to_body();
        assert_eq!(body["error"], "invalid_file");
        assert_eq!(body["actualType"], "application/pdf");
        assert_eq!(body["allowedTypes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_upload_failed_carries_details() {
        let err = EvidenceError::UploadFailed {
            details: "permission denied".to_string(),
        };
        let body = err.to_body();
        assert_eq!(body["error"], "upload_failed");
        assert_eq!(body["message"], "Failed to save evidence file");
        assert_eq!(body["details"], "permission denied");
    }

    #[test]
    fn test_invalid_image_has_no_details() {
        let body = EvidenceError::InvalidImage.to_body();
        let obj = body.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(body["message"], "File is not a valid image");
    }
}
