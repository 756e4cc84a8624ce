//! Cache key patterns.
//!
//! The read-side cache (a separate frontend-facing layer) keys its
//! entries by URL path and query. Mutations only need to know which
//! patterns to wipe, so the patterns live here in one place.

use atelier_core::types::DbId;

/// Everything cached under one activity's slot listings.
pub fn activity_slots(activity_id: DbId) -> String {
    format!("/activity/{activity_id}/slots*")
}

/// Slot listings across every activity. Used after schedule
/// generation, which touches an unknown set of activities.
pub fn all_activity_slots() -> String {
    "/activity/*/slots*".to_string()
}

/// All template listings.
pub fn templates() -> String {
    "templates*".to_string()
}

/// Operator-facing record listings, all pages and filters.
pub fn records_all() -> String {
    "records:all:*".to_string()
}

/// One client's record listings, all pages.
pub fn client_records(phone: &str) -> String {
    format!("client:records:{phone}:*")
}

/// All subscription listings.
pub fn subscriptions_all() -> String {
    "subscriptions:all:*".to_string()
}

/// Generated schedule views.
pub fn schedule() -> String {
    "schedule*".to_string()
}

/// Admin error log listings, all pages.
pub fn studio_errors() -> String {
    "admin/errors*".to_string()
}
