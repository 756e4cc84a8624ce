use crate::types::DbId;

/// Domain error taxonomy shared by every crate in the workspace.
///
/// `CapacityExceeded` is deliberately distinct from `Conflict`: a full
/// slot is an expected outcome a client can react to (pick another
/// slot), while a conflict (duplicate child, duplicate template) means
/// the request itself is wrong.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Slot {slot_id} has no free places left")]
    CapacityExceeded { slot_id: DbId },

    #[error("Subscription {subscription_id} has no visits left")]
    QuotaExhausted { subscription_id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
