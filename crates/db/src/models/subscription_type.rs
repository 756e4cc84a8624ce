//! Subscription type entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscription_types` table: a purchasable bundle of
/// visits to one activity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionType {
    pub id: DbId,
    pub name: String,
    pub activity_id: DbId,
    pub price: i32,
    /// How many visits a subscription of this type grants.
    pub visits_count: i32,
    /// Validity window length applied from the subscription start date.
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a subscription type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionType {
    pub name: String,
    pub activity_id: DbId,
    pub price: i32,
    pub visits_count: i32,
    pub duration_days: i32,
}

/// DTO for updating a subscription type. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubscriptionType {
    pub name: Option<String>,
    pub price: Option<i32>,
    pub visits_count: Option<i32>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
}
