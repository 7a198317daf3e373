//! HTTP handlers for parcel-api.
//!
//! Every tracking-scoped handler runs the same two checks first, in order:
//! tracking-number format (400), then existence in the tracking repository
//! (404). Only then does handler-specific work begin.

pub mod evidence;
pub mod health;
pub mod tracking;

use parcel_core::{is_valid_tracking_number, TrackingRecord};
use tracing::debug;

use crate::{ApiError, AppState};

/// Validate the tracking number's format and resolve its record.
pub(crate) fn resolve_tracking(
    state: &AppState,
    tracking_number: &str,
) -> Result<TrackingRecord, ApiError> {
    if !is_valid_tracking_number(tracking_number) {
        debug!(
            subsystem = "api",
            tracking_number,
            error_kind = "invalid_tracking_number",
            "Rejected tracking number format"
        );
        return Err(ApiError::InvalidTrackingNumber(tracking_number.to_string()));
    }

    state.tracking.lookup(tracking_number).ok_or_else(|| {
        debug!(
            subsystem = "api",
            tracking_number,
            error_kind = "tracking_not_found",
            "Unknown tracking number"
        );
        ApiError::TrackingNotFound(tracking_number.to_string())
    })
}
