//! Booking record entity model and DTOs.

use atelier_core::booking::Kid;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Snapshot of what was booked, embedded in the record as JSONB.
///
/// Copied at booking time so later edits to the activity (name, price)
/// never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetail {
    pub activity_id: DbId,
    pub activity_name: String,
    pub number_of_kids: i32,
    pub kids: Vec<Kid>,
    pub date: Timestamp,
}

/// A row from the `records` table: one confirmed booking of one or
/// more children into a slot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Record {
    pub id: DbId,
    pub user_id: DbId,
    pub slot_id: DbId,
    /// Set when the booking was funded by a subscription visit.
    pub subscription_id: Option<DbId>,
    /// The roster child consumed by an auto-enrolled booking.
    pub sub_kid_id: Option<DbId>,
    pub phone_number: String,
    pub parent_name: String,
    pub total_price: i32,
    pub details: Json<RecordDetail>,
    pub created_at: Timestamp,
}

/// DTO for a customer-facing booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub slot_id: DbId,
    pub number_of_kids: i32,
    pub kids: Vec<Kid>,
}

/// Paginated record listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}
