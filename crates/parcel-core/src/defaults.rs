//! Centralized default constants for the parcel tracking service.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// TRACKING
// =============================================================================

/// Accepted tracking number shape: 10-20 uppercase letters or digits.
pub const TRACKING_NUMBER_PATTERN: &str = r"^[A-Z0-9]{10,20}$";

// =============================================================================
// EVIDENCE UPLOADS
// =============================================================================

/// Maximum accepted evidence image size (5 MiB).
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types a client may declare for an evidence upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Image formats accepted after content sniffing.
pub const ALLOWED_IMAGE_FORMATS: &[&str] = &["JPEG", "PNG", "GIF", "WEBP"];

/// Multipart field carrying the image payload.
pub const IMAGE_FIELD: &str = "image";

/// Longest original-filename extension carried over to the stored filename.
pub const MAX_EXTENSION_LEN: usize = 16;

/// Storage prefix under which evidence files are namespaced by tracking number.
pub const EVIDENCE_DIR: &str = "evidence";

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default filesystem root for uploaded media.
pub const MEDIA_ROOT: &str = "./media";

/// Default URL prefix under which uploaded media is served.
pub const MEDIA_URL: &str = "/media";

/// Default CORS origin whitelist.
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Whole-request body cap as a multiple of the upload cap.
///
/// Must exceed 1 so oversize images reach validation and receive a typed
/// `file_too_large` response instead of a bare transport error.
pub const REQUEST_BODY_LIMIT_FACTOR: u64 = 4;
