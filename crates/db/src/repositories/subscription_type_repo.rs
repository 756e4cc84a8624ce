//! Repository for the `subscription_types` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription_type::{
    CreateSubscriptionType, SubscriptionType, UpdateSubscriptionType,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, activity_id, price, visits_count, duration_days, is_active, created_at, updated_at";

/// Provides CRUD operations for subscription types.
pub struct SubscriptionTypeRepo;

impl SubscriptionTypeRepo {
    /// Insert a new subscription type.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscriptionType,
    ) -> Result<SubscriptionType, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscription_types (name, activity_id, price, visits_count, duration_days) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriptionType>(&query)
            .bind(&input.name)
            .bind(input.activity_id)
            .bind(input.price)
            .bind(input.visits_count)
            .bind(input.duration_days)
            .fetch_one(pool)
            .await
    }

    /// Find a subscription type by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubscriptionType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscription_types WHERE id = $1");
        sqlx::query_as::<_, SubscriptionType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all subscription types.
    pub async fn list(pool: &PgPool) -> Result<Vec<SubscriptionType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscription_types ORDER BY id ASC");
        sqlx::query_as::<_, SubscriptionType>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the types attached to one activity.
    pub async fn list_by_activity(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<SubscriptionType>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM subscription_types WHERE activity_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, SubscriptionType>(&query)
            .bind(activity_id)
            .fetch_all(pool)
            .await
    }

    /// Update a subscription type. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubscriptionType,
    ) -> Result<Option<SubscriptionType>, sqlx::Error> {
        let query = format!(
            "UPDATE subscription_types SET \
                name = COALESCE($2, name), \
                price = COALESCE($3, price), \
                visits_count = COALESCE($4, visits_count), \
                duration_days = COALESCE($5, duration_days), \
                is_active = COALESCE($6, is_active), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriptionType>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.visits_count)
            .bind(input.duration_days)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a subscription type. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscription_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
