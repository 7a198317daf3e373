//! Domain models for shipments and delivery evidence.
//!
//! Wire field names are camelCased; Rust field names stay snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::MAX_EXTENSION_LEN;

// =============================================================================
// TRACKING
// =============================================================================

/// Lifecycle status of a shipment or of a single tracking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
}

/// Kind of facility at which a tracking event was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Origin,
    SortFacility,
    Delivery,
}

/// Postal address of a shipment's origin or destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line; the seed data only carries city-level addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

/// Physical package details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub weight: f64,
    pub dimensions: Dimensions,
    pub description: String,
}

/// A single scan or status change in a shipment's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub timestamp: DateTime<Utc>,
    pub status: ShipmentStatus,
    pub location: String,
    pub description: String,
    pub facility_type: FacilityType,
}

/// Full tracking information for one shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub estimated_delivery: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_delivery: Option<DateTime<Utc>>,
    pub carrier: String,
    pub service: String,
    pub origin: Address,
    pub destination: Address,
    pub package: PackageInfo,
    /// Events in chronological order.
    pub events: Vec<TrackingEvent>,
}

// =============================================================================
// EVIDENCE
// =============================================================================

/// An uploaded file as received from the client, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename.
    pub original_name: String,
    /// Client-declared MIME type.
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Extension of the original filename including the leading dot, or an
    /// empty string when there is none.
    ///
    /// Only short ASCII-alphanumeric extensions are kept, so the stored
    /// filename is always safe to use verbatim in a URL path.
    pub fn extension(&self) -> &str {
        let name = self
            .original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.original_name);
        let ext = match name.rfind('.') {
            // A leading dot marks a hidden file, not an extension.
            Some(pos) if pos > 0 => &name[pos + 1..],
            _ => return "",
        };
        if ext.is_empty()
            || ext.len() > MAX_EXTENSION_LEN
            || !ext.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return "";
        }
        &name[name.len() - ext.len() - 1..]
    }
}

/// Optional descriptive fields submitted with an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceMetadata {
    pub description: String,
    pub location: String,
}

/// Delivery evidence metadata.
///
/// `tracking_number` and `storage_path` are internal and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub tracking_number: String,
    /// Stored filename: `{id}{extension}`.
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
    /// Set by the caller once the upload has been accepted.
    pub uploaded_at: Option<DateTime<Utc>>,
    pub description: String,
    pub location: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub storage_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_evidence() -> Evidence {
        Evidence {
            id: Uuid::nil(),
            tracking_number: "1Z999AA1234567890".to_string(),
            filename: "00000000-0000-0000-0000-000000000000.jpg".to_string(),
            original_name: "porch.jpg".to_string(),
            size: 1024,
            mime_type: "image/jpeg".to_string(),
            uploaded_at: None,
            description: "Left at front door".to_string(),
            location: "Front porch".to_string(),
            url: "/media/evidence/1Z999AA1234567890/00000000-0000-0000-0000-000000000000.jpg"
                .to_string(),
            storage_path: "evidence/1Z999AA1234567890/00000000-0000-0000-0000-000000000000.jpg"
                .to_string(),
        }
    }

    #[test]
    fn test_evidence_wire_shape() {
        let value = serde_json::to_value(sample_evidence()).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "description",
                "filename",
                "id",
                "location",
                "mimeType",
                "originalName",
                "size",
                "uploadedAt",
                "url"
            ]
        );
        assert!(obj["uploadedAt"].is_null());
    }

    #[test]
    fn test_evidence_uploaded_at_serializes_rfc3339() {
        let mut evidence = sample_evidence();
        evidence.uploaded_at = Some(Utc.with_ymd_and_hms(2025, 8, 28, 13, 45, 0).unwrap());
        let value = serde_json::to_value(evidence).unwrap();
        assert_eq!(value["uploadedAt"], "2025-08-28T13:45:00Z");
    }

    #[test]
    fn test_shipment_status_snake_case() {
        let value = serde_json::to_value(ShipmentStatus::OutForDelivery).unwrap();
        assert_eq!(value, "out_for_delivery");
    }

    #[test]
    fn test_facility_type_snake_case() {
        let value = serde_json::to_value(FacilityType::SortFacility).unwrap();
        assert_eq!(value, "sort_facility");
    }

    #[test]
    fn test_address_omits_missing_street() {
        let address = Address {
            address: None,
            city: "Miami".to_string(),
            state: "FL".to_string(),
            country: "USA".to_string(),
            postal_code: "33101".to_string(),
        };
        let value = serde_json::to_value(address).unwrap();
        assert!(value.get("address").is_none());
        assert_eq!(value["postalCode"], "33101");
    }

    #[test]
    fn test_uploaded_file_extension() {
        assert_eq!(UploadedFile::new("photo.jpg", "image/jpeg", vec![]).extension(), ".jpg");
        assert_eq!(
            UploadedFile::new("archive.tar.png", "image/png", vec![]).extension(),
            ".png"
        );
        assert_eq!(UploadedFile::new("noext", "image/png", vec![]).extension(), "");
        assert_eq!(UploadedFile::new(".hidden", "image/png", vec![]).extension(), "");
        assert_eq!(
            UploadedFile::new("dir.d/photo", "image/png", vec![]).extension(),
            ""
        );
    }

    #[test]
    fn test_uploaded_file_extension_rejects_url_unsafe_characters() {
        for name in [
            "door.p#g",
            "door.p?g",
            "door.%41",
            "door.p g",
            "door.",
            "door.png\u{0}",
            "door.abcdefghijklmnopq",
        ] {
            assert_eq!(
                UploadedFile::new(name, "image/png", vec![]).extension(),
                "",
                "{:?}",
                name
            );
        }
        assert_eq!(
            UploadedFile::new("door.JPEG", "image/jpeg", vec![]).extension(),
            ".JPEG"
        );
        assert_eq!(
            UploadedFile::new("door.abcdefghijklmnop", "image/png", vec![]).extension(),
            ".abcdefghijklmnop"
        );
    }

    #[test]
    fn test_uploaded_file_size() {
        let file = UploadedFile::new("a.png", "image/png", vec![0u8; 42]);
        assert_eq!(file.size(), 42);
    }
}
