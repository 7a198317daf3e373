//! Tracking number validation and the static tracking repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::TRACKING_NUMBER_PATTERN;
use crate::models::{
    Address, Dimensions, FacilityType, PackageInfo, ShipmentStatus, TrackingEvent, TrackingRecord,
};
use crate::traits::TrackingRepository;

static TRACKING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(TRACKING_NUMBER_PATTERN).expect("tracking number pattern is valid"));

/// Check a tracking number's format: 10-20 uppercase letters or digits.
///
/// This is a shape check only; no carrier checksum is verified.
pub fn is_valid_tracking_number(tracking_number: &str) -> bool {
    TRACKING_NUMBER_RE.is_match(tracking_number)
}

/// Tracking repository backed by a fixed in-process mapping.
#[derive(Debug, Clone)]
pub struct StaticTrackingRepository {
    records: HashMap<String, TrackingRecord>,
}

impl StaticTrackingRepository {
    /// Build a repository from arbitrary records, keyed by tracking number.
    pub fn new(records: impl IntoIterator<Item = TrackingRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (r.tracking_number.clone(), r))
                .collect(),
        }
    }

    /// Repository preloaded with the sample shipments.
    pub fn with_seed_data() -> Self {
        Self::new(seed_records())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for StaticTrackingRepository {
    fn default() -> Self {
        Self::with_seed_data()
    }
}

impl TrackingRepository for StaticTrackingRepository {
    fn lookup(&self, tracking_number: &str) -> Option<TrackingRecord> {
        self.records.get(tracking_number).cloned()
    }

    fn contains(&self, tracking_number: &str) -> bool {
        self.records.contains_key(tracking_number)
    }
}

fn at(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap_or_default()
}

fn address(city: &str, state: &str, postal_code: &str) -> Address {
    Address {
        address: None,
        city: city.to_string(),
        state: state.to_string(),
        country: "USA".to_string(),
        postal_code: postal_code.to_string(),
    }
}

fn event(
    timestamp: &str,
    status: ShipmentStatus,
    location: &str,
    description: &str,
    facility_type: FacilityType,
) -> TrackingEvent {
    TrackingEvent {
        timestamp: at(timestamp),
        status,
        location: location.to_string(),
        description: description.to_string(),
        facility_type,
    }
}

/// The two sample shipments served by the mock repository.
pub fn seed_records() -> Vec<TrackingRecord> {
    vec![
        TrackingRecord {
            tracking_number: "1Z999AA1234567890".to_string(),
            status: ShipmentStatus::InTransit,
            estimated_delivery: at("2025-08-30T15:30:00Z"),
            actual_delivery: None,
            carrier: "UPS".to_string(),
            service: "Ground".to_string(),
            origin: address("New York", "NY", "10001"),
            destination: address("Los Angeles", "CA", "90210"),
            package: PackageInfo {
                weight: 2.5,
                dimensions: Dimensions {
                    length: 12,
                    width: 8,
                    height: 6,
                },
                description: "Electronics".to_string(),
            },
            events: vec![
                event(
                    "2025-08-26T10:00:00Z",
                    ShipmentStatus::PickedUp,
                    "New York, NY",
                    "Package picked up",
                    FacilityType::Origin,
                ),
                event(
                    "2025-08-27T08:30:00Z",
                    ShipmentStatus::InTransit,
                    "Philadelphia, PA",
                    "Departed from facility",
                    FacilityType::SortFacility,
                ),
            ],
        },
        TrackingRecord {
            tracking_number: "FDX123456789012".to_string(),
            status: ShipmentStatus::Delivered,
            estimated_delivery: at("2025-08-28T14:00:00Z"),
            actual_delivery: Some(at("2025-08-28T13:45:00Z")),
            carrier: "FedEx".to_string(),
            service: "Express".to_string(),
            origin: address("Chicago", "IL", "60601"),
            destination: address("Miami", "FL", "33101"),
            package: PackageInfo {
                weight: 1.2,
                dimensions: Dimensions {
                    length: 10,
                    width: 6,
                    height: 4,
                },
                description: "Documents".to_string(),
            },
            events: vec![
                event(
                    "2025-08-26T09:00:00Z",
                    ShipmentStatus::PickedUp,
                    "Chicago, IL",
                    "Package picked up",
                    FacilityType::Origin,
                ),
                event(
                    "2025-08-27T12:00:00Z",
                    ShipmentStatus::InTransit,
                    "Memphis, TN",
                    "In transit",
                    FacilityType::SortFacility,
                ),
                event(
                    "2025-08-28T08:00:00Z",
                    ShipmentStatus::OutForDelivery,
                    "Miami, FL",
                    "Out for delivery",
                    FacilityType::Delivery,
                ),
                event(
                    "2025-08-28T13:45:00Z",
                    ShipmentStatus::Delivered,
                    "Miami, FL",
                    "Delivered",
                    FacilityType::Delivery,
                ),
            ],
        },
    ]
}
