//! Activity slot entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Slot provenance values stored in `activity_slots.source`.
pub const SOURCE_TEMPLATE: &str = "template";
pub const SOURCE_MANUAL: &str = "manual";

/// A row from the `activity_slots` table: one capacity-bounded
/// occurrence of an activity at a concrete start time.
///
/// `booked` is only ever written inside a transaction that holds a
/// `FOR UPDATE` lock on the row; reads outside a lock are advisory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivitySlot {
    pub id: DbId,
    pub activity_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub capacity: i32,
    pub booked: i32,
    pub template_id: Option<DbId>,
    pub source: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ActivitySlot {
    /// Free places left on this slot.
    pub fn remaining(&self) -> i32 {
        self.capacity - self.booked
    }
}

/// DTO for creating a one-off slot by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateManualSlot {
    pub start_time: Timestamp,
    pub capacity: i32,
}

/// DTO for updating a slot. Only the start time and capacity may be
/// rewritten; `booked` never moves through this path.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSlot {
    pub start_time: Option<Timestamp>,
    pub capacity: Option<i32>,
}

/// Insert payload produced by the schedule generator.
#[derive(Debug, Clone)]
pub struct NewGeneratedSlot {
    pub activity_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub capacity: i32,
    pub template_id: DbId,
}

/// Outcome of a cascading slot deletion.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SlotCascadeSummary {
    pub records_removed: u32,
    pub visits_restored: u32,
}
