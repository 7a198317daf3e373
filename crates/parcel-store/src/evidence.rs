//! In-memory evidence index over a pluggable file storage backend.
//!
//! Evidence metadata is kept per tracking number in upload order. The whole
//! index sits behind one async `RwLock`: appends and list-then-mutate
//! sequences (delete, timestamp stamping) take the write lock so concurrent
//! requests for the same tracking number cannot lose entries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parcel_core::{
    defaults::{MAX_UPLOAD_SIZE_BYTES, MEDIA_URL},
    sanitize_filename, validate_upload, Evidence, EvidenceError, EvidenceMetadata, UploadedFile,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::file_storage::{evidence_storage_path, StorageBackend};

/// Evidence store: validates uploads, persists files, and indexes metadata.
pub struct EvidenceStore {
    backend: Arc<dyn StorageBackend>,
    index: RwLock<HashMap<String, Vec<Evidence>>>,
    max_size_bytes: u64,
    media_url: String,
}

impl EvidenceStore {
    /// Create a store over the given backend with default limits.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create a store over a shared backend.
    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            index: RwLock::new(HashMap::new()),
            max_size_bytes: MAX_UPLOAD_SIZE_BYTES,
            media_url: MEDIA_URL.to_string(),
        }
    }

    /// Override the upload size cap.
    pub fn with_max_size(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Override the URL prefix under which stored files are served.
    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = media_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Run every upload check and return all violations, in check order.
    pub fn validate(&self, file: &UploadedFile) -> Vec<EvidenceError> {
        validate_upload(file, self.max_size_bytes)
    }

    /// Validate and persist an evidence file.
    ///
    /// Only the first validation violation is returned. On success the file
    /// has been written and the evidence appended to the tracking number's
    /// list. `uploaded_at` is left unset; see [`Self::stamp_uploaded`].
    pub async fn save(
        &self,
        tracking_number: &str,
        file: &UploadedFile,
        metadata: EvidenceMetadata,
    ) -> Result<Evidence, EvidenceError> {
        if let Some(first) = self.validate(file).into_iter().next() {
            warn!(
                subsystem = "store",
                op = "save",
                tracking_number,
                error_kind = %first.kind(),
                size_bytes = file.size(),
                mime_type = %file.content_type,
                "Evidence rejected"
            );
            return Err(first);
        }

        let id = Uuid::new_v4();
        let filename = format!("{}{}", id, file.extension());
        let storage_path = evidence_storage_path(tracking_number, &filename);

        if let Err(e) = self.backend.write(&storage_path, &file.data).await {
            warn!(
                subsystem = "store",
                op = "save",
                tracking_number,
                storage_path = %storage_path,
                error = %e,
                "Failed to write evidence file"
            );
            return Err(EvidenceError::UploadFailed {
                details: e.to_string(),
            });
        }

        let evidence = Evidence {
            id,
            tracking_number: tracking_number.to_string(),
            url: format!("{}/{}", self.media_url, storage_path),
            filename,
            original_name: sanitize_filename(&file.original_name),
            size: file.size(),
            mime_type: file.content_type.clone(),
            uploaded_at: None,
            description: metadata.description,
            location: metadata.location,
            storage_path,
        };

        self.index
            .write()
            .await
            .entry(tracking_number.to_string())
            .or_default()
            .push(evidence.clone());

        info!(
            subsystem = "store",
            op = "save",
            tracking_number,
            evidence_id = %evidence.id,
            size_bytes = evidence.size,
            "Evidence stored"
        );
        Ok(evidence)
    }

    /// Record the acceptance time of a saved evidence entry.
    ///
    /// Returns the updated entry, or `None` if it no longer exists.
    pub async fn stamp_uploaded(
        &self,
        tracking_number: &str,
        evidence_id: Uuid,
        at: DateTime<Utc>,
    ) -> Option<Evidence> {
        let mut index = self.index.write().await;
        let entry = index
            .get_mut(tracking_number)?
            .iter_mut()
            .find(|e| e.id == evidence_id)?;
        entry.uploaded_at = Some(at);
        Some(entry.clone())
    }

    /// All evidence for a tracking number in upload order. Empty if none.
    pub async fn list_by_tracking(&self, tracking_number: &str) -> Vec<Evidence> {
        let list = self
            .index
            .read()
            .await
            .get(tracking_number)
            .cloned()
            .unwrap_or_default();
        debug!(
            subsystem = "store",
            op = "list",
            tracking_number,
            result_count = list.len(),
            "Listed evidence"
        );
        list
    }

    /// Delete one evidence entry and its file.
    ///
    /// A file that is already gone is not an error. If removing the file
    /// fails the entry is kept and `DeleteFailed` is returned.
    pub async fn delete(&self, tracking_number: &str, evidence_id: &str) -> Result<(), EvidenceError> {
        let mut index = self.index.write().await;

        // A tracking number keeps its (possibly empty) list once anything
        // has been uploaded for it.
        let list = index
            .get_mut(tracking_number)
            .ok_or(EvidenceError::NoEvidenceForTracking)?;

        let position = Uuid::parse_str(evidence_id)
            .ok()
            .and_then(|id| list.iter().position(|e| e.id == id))
            .ok_or(EvidenceError::EvidenceNotFound)?;

        let storage_path = list[position].storage_path.clone();
        let removal = match self.backend.exists(&storage_path).await {
            Ok(true) => self.backend.delete(&storage_path).await,
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = removal {
            warn!(
                subsystem = "store",
                op = "delete",
                tracking_number,
                evidence_id,
                storage_path = %storage_path,
                error = %e,
                "Failed to delete evidence file"
            );
            return Err(EvidenceError::DeleteFailed {
                details: e.to_string(),
            });
        }

        list.remove(position);

        info!(
            subsystem = "store",
            op = "delete",
            tracking_number,
            evidence_id,
            "Evidence deleted"
        );
        Ok(())
    }
}
