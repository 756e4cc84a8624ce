//! Client-managed child profile ("user kid") model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_kids` table: a free-standing child profile a
/// client keeps for quicker booking, unrelated to any subscription
/// roster.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserKid {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user kid.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserKid {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// DTO for updating a user kid. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserKid {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}
