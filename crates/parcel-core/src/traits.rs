//! Core traits for the parcel tracking service.
//!
//! These define the seams between the HTTP layer and its data sources so
//! handlers can be exercised against any implementation.

use crate::models::TrackingRecord;

/// Read-only source of shipment tracking records.
pub trait TrackingRepository: Send + Sync {
    /// Look up the record for a tracking number. `None` when unknown.
    fn lookup(&self, tracking_number: &str) -> Option<TrackingRecord>;

    /// Whether a record exists for the tracking number.
    fn contains(&self, tracking_number: &str) -> bool {
        self.lookup(tracking_number).is_some()
    }
}
