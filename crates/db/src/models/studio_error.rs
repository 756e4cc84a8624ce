//! Studio error log entity model.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `studio_errors` table: one operational failure kept
/// for administrators, typically a subscription child the enrollment
/// engine could not place into a slot.
///
/// `subscription_id` and `slot_id` are bare ids without foreign keys;
/// an error entry outlives both sides.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudioError {
    pub id: DbId,
    pub subscription_id: DbId,
    pub slot_id: DbId,
    pub info: String,
    pub created_at: Timestamp,
}

/// One page of the admin error listing.
#[derive(Debug, Clone, Serialize)]
pub struct StudioErrorPage {
    pub errors: Vec<StudioError>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}
