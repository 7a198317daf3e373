//! Tracking lookup handler.

use axum::{
    extract::{Path, State},
    Json,
};
use parcel_core::TrackingRecord;

use super::resolve_tracking;
use crate::{ApiError, AppState};

/// Get the tracking record for a package.
///
/// # Returns
/// - 200 OK with the tracking record
/// - 400 Bad Request if the tracking number is malformed
/// - 404 Not Found if the tracking number is unknown
pub async fn get_tracking_info(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingRecord>, ApiError> {
    let record = resolve_tracking(&state, &tracking_number)?;
    Ok(Json(record))
}
