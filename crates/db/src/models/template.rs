//! Schedule template entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `schedule_templates` table: a recurring weekly slot
/// pattern (day + wall-clock time + capacity) for one activity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleTemplate {
    pub id: DbId,
    pub activity_id: DbId,
    /// Monday = 1 through Friday = 5.
    pub day_of_week: i16,
    /// Wall-clock start as `"HH:MM"` (UTC).
    pub start_time: String,
    pub capacity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template under an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub day_of_week: i16,
    pub start_time: String,
    /// Defaults to 10 when omitted.
    pub capacity: Option<i32>,
}

/// DTO for updating a template. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplate {
    pub day_of_week: Option<i16>,
    pub start_time: Option<String>,
    pub capacity: Option<i32>,
}
