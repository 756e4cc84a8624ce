//! Activity entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub name: String,
    pub description: String,
    /// Price per child per visit, in minor currency units.
    pub price: i32,
    pub duration_minutes: i32,
    /// Whether weekly schedule templates apply to this activity.
    pub is_regular: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new activity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub name: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_minutes: i32,
    pub is_regular: Option<bool>,
}

/// DTO for updating an existing activity. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActivity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub is_regular: Option<bool>,
}
