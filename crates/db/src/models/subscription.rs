//! Subscription entity models and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscriptions` table: a pre-paid bundle of visits
/// for one user, consumed by records over its validity window.
///
/// `visits_used` is only ever written under a `FOR UPDATE` lock, by
/// the booking path (increment), the auto-enrollment engine
/// (increment) and cancellation (decrement, floored at zero).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub subscription_type_id: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub visits_total: i32,
    pub visits_used: i32,
    pub price_paid: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    pub fn is_exhausted(&self) -> bool {
        self.visits_used >= self.visits_total
    }
}

/// A row from the `sub_kids` table: a child on a subscription's
/// enrollment roster.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubKid {
    pub id: DbId,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A subscription together with its enrolled children.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionWithKids {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub kids: Vec<SubKid>,
}

/// DTO for one child on a new subscription's roster.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubKid {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// DTO for purchasing a subscription. The visit quota and validity
/// window come from the subscription type, not from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscription {
    pub user_id: DbId,
    pub subscription_type_id: DbId,
    pub start_date: Timestamp,
    pub price_paid: i32,
    pub kids: Vec<CreateSubKid>,
}

/// Unlocked candidate row for the auto-enrollment engine: a
/// subscription targeting the activity with quota apparently left,
/// joined with the requester identity and activity name needed to
/// build the record. Advisory only; the engine re-checks everything
/// under locks before writing.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentCandidate {
    pub id: DbId,
    pub user_id: DbId,
    pub visits_total: i32,
    pub visits_used: i32,
    pub price_paid: i32,
    pub phone_number: String,
    pub parent_name: String,
    pub activity_name: String,
}
