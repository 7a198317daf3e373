//! Delivery evidence HTTP handlers.
//!
//! Uploads are `multipart/form-data` with the image in the `image` field and
//! optional `description` and `location` text fields.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use parcel_core::{defaults::IMAGE_FIELD, Evidence, EvidenceMetadata, UploadedFile};
use serde::Serialize;
use tracing::{debug, info};

use super::resolve_tracking;
use crate::{ApiError, AppState};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceListResponse {
    pub tracking_number: String,
    pub evidence_count: usize,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvidenceResponse {
    pub success: bool,
    pub message: &'static str,
    pub tracking_number: String,
    pub evidence: Evidence,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEvidenceResponse {
    pub success: bool,
    pub message: &'static str,
    pub tracking_number: String,
    pub evidence_id: String,
}

/// List all evidence uploaded for a tracking number, oldest first.
///
/// # Returns
/// - 200 OK with `{trackingNumber, evidenceCount, evidence}`
/// - 400 Bad Request if the tracking number is malformed
/// - 404 Not Found if the tracking number is unknown
pub async fn list_evidence(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<EvidenceListResponse>, ApiError> {
    resolve_tracking(&state, &tracking_number)?;

    let evidence = state.evidence.list_by_tracking(&tracking_number).await;
    Ok(Json(EvidenceListResponse {
        evidence_count: evidence.len(),
        tracking_number,
        evidence,
    }))
}

/// Upload a delivery evidence image.
///
/// # Returns
/// - 201 Created with the stored evidence
/// - 400 Bad Request for a malformed tracking number, a missing `image`
///   field, or an image that fails validation
/// - 404 Not Found if the tracking number is unknown
/// - 413 Payload Too Large if the image exceeds the upload cap
pub async fn upload_evidence(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadEvidenceResponse>), ApiError> {
    resolve_tracking(&state, &tracking_number)?;

    let mut multipart = multipart.map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let (file, metadata) = read_upload_form(&mut multipart).await?;
    let file = file.ok_or_else(|| {
        debug!(
            subsystem = "api",
            tracking_number = %tracking_number,
            error_kind = "missing_file",
            "Upload without image field"
        );
        ApiError::MissingFile
    })?;

    let saved = state.evidence.save(&tracking_number, &file, metadata).await?;

    let uploaded_at = Utc::now();
    let evidence = match state
        .evidence
        .stamp_uploaded(&tracking_number, saved.id, uploaded_at)
        .await
    {
        Some(stamped) => stamped,
        // Deleted by a concurrent request before stamping.
        None => Evidence {
            uploaded_at: Some(uploaded_at),
            ..saved
        },
    };

    info!(
        subsystem = "api",
        tracking_number = %tracking_number,
        evidence_id = %evidence.id,
        size_bytes = evidence.size,
        mime_type = %evidence.mime_type,
        "Delivery evidence uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadEvidenceResponse {
            success: true,
            message: "Delivery evidence uploaded successfully",
            tracking_number,
            evidence,
        }),
    ))
}

/// Delete one evidence entry and its stored file.
///
/// # Returns
/// - 200 OK with a confirmation payload
/// - 400 Bad Request if the tracking number is malformed
/// - 404 Not Found if the tracking number or evidence is unknown, or the
///   stored file could not be removed
pub async fn delete_evidence(
    State(state): State<AppState>,
    Path((tracking_number, evidence_id)): Path<(String, String)>,
) -> Result<Json<DeleteEvidenceResponse>, ApiError> {
    resolve_tracking(&state, &tracking_number)?;

    state.evidence.delete(&tracking_number, &evidence_id).await?;

    Ok(Json(DeleteEvidenceResponse {
        success: true,
        message: "Evidence deleted successfully",
        tracking_number,
        evidence_id,
    }))
}

/// Drain the multipart body into the image file (if any) and metadata.
///
/// Only a part named `image` that carries a non-empty filename counts as the
/// file. A plain text field with that name, or a file input submitted with
/// nothing chosen, is ignored.
async fn read_upload_form(
    multipart: &mut Multipart,
) -> Result<(Option<UploadedFile>, EvidenceMetadata), ApiError> {
    let mut file = None;
    let mut metadata = EvidenceMetadata::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            IMAGE_FIELD
                if file.is_none() && field.file_name().is_some_and(|n| !n.is_empty()) =>
            {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some(UploadedFile::new(original_name, content_type, data.to_vec()));
            }
            "description" | "location" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                if name == "description" {
                    metadata.description = value;
                } else {
                    metadata.location = value;
                }
            }
            _ => {}
        }
    }

    Ok((file, metadata))
}
