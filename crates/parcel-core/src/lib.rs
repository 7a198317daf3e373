//! # parcel-core
//!
//! Core types, validation, and tracking data for the parcel tracking service.
//!
//! This crate holds everything that does not touch the network or the
//! filesystem: domain models, the error taxonomy, upload validation, and the
//! tracking repository.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod models;
pub mod tracking;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, EvidenceError, Result};
pub use file_safety::{detect_image_format, sanitize_filename, validate_upload};
pub use models::*;
pub use tracking::{is_valid_tracking_number, seed_records, StaticTrackingRepository};
pub use traits::*;
