//! # parcel-store
//!
//! Evidence storage for the parcel tracking service.
//!
//! - [`FilesystemBackend`]: atomic file writes under a media root
//! - [`EvidenceStore`]: upload validation plus an in-memory evidence index
//!   keyed by tracking number

pub mod evidence;
pub mod file_storage;

pub use evidence::EvidenceStore;
pub use file_storage::{evidence_storage_path, FilesystemBackend, StorageBackend};
