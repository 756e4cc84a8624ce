//! Repository for the `user_kids` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::kid::{CreateUserKid, UpdateUserKid, UserKid};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, age, gender, created_at, updated_at";

/// Provides CRUD operations for client-managed child profiles.
pub struct KidRepo;

impl KidRepo {
    /// Insert a new child profile for a user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateUserKid,
    ) -> Result<UserKid, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_kids (user_id, name, age, gender) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserKid>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.gender)
            .fetch_one(pool)
            .await
    }

    /// Find a child profile by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserKid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_kids WHERE id = $1");
        sqlx::query_as::<_, UserKid>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all child profiles of a user.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserKid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_kids WHERE user_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, UserKid>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a child profile. Only non-`None` fields are applied.
    ///
    /// Scoped to the owning user so a client can never edit someone
    /// else's kid. Returns `None` if no matching row exists.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateUserKid,
    ) -> Result<Option<UserKid>, sqlx::Error> {
        let query = format!(
            "UPDATE user_kids SET \
                name = COALESCE($3, name), \
                age = COALESCE($4, age), \
                gender = COALESCE($5, gender), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserKid>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.gender)
            .fetch_optional(pool)
            .await
    }

    /// Delete a child profile, scoped to the owning user. Returns
    /// `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_kids WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
