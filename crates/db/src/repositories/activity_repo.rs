//! Repository for the `activities` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity, UpdateActivity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, description, price, duration_minutes, is_regular, created_at, updated_at";

/// Provides CRUD operations for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (name, description, price, duration_minutes, is_regular) \
             VALUES ($1, COALESCE($2, ''), $3, $4, COALESCE($5, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.duration_minutes)
            .bind(input.is_regular)
            .fetch_one(pool)
            .await
    }

    /// Find an activity by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all activities, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities ORDER BY name ASC");
        sqlx::query_as::<_, Activity>(&query).fetch_all(pool).await
    }

    /// List the activities the schedule generator scans.
    pub async fn list_regular(pool: &PgPool) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE is_regular = true ORDER BY id ASC");
        sqlx::query_as::<_, Activity>(&query).fetch_all(pool).await
    }

    /// Update an activity. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateActivity,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "UPDATE activities SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                price = COALESCE($4, price), \
                duration_minutes = COALESCE($5, duration_minutes), \
                is_regular = COALESCE($6, is_regular), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.duration_minutes)
            .bind(input.is_regular)
            .fetch_optional(pool)
            .await
    }

    /// Delete an activity. Templates and slots cascade at the storage
    /// level. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
