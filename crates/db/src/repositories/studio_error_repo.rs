//! Repository for the `studio_errors` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::studio_error::{StudioError, StudioErrorPage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, subscription_id, slot_id, info, created_at";

/// Persists operational failures for later admin review.
pub struct StudioErrorRepo;

impl StudioErrorRepo {
    /// Log a failure against a subscription and slot pair. `info` is
    /// truncated to the 1000 characters the column holds.
    pub async fn record(
        pool: &PgPool,
        subscription_id: DbId,
        slot_id: DbId,
        info: &str,
    ) -> Result<StudioError, sqlx::Error> {
        let info: String = info.chars().take(1000).collect();
        let query = format!(
            "INSERT INTO studio_errors (subscription_id, slot_id, info) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudioError>(&query)
            .bind(subscription_id)
            .bind(slot_id)
            .bind(&info)
            .fetch_one(pool)
            .await
    }

    /// Paginated listing for operators, oldest first.
    pub async fn list(
        pool: &PgPool,
        page: i64,
        page_size: i64,
    ) -> Result<StudioErrorPage, sqlx::Error> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM studio_errors")
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM studio_errors \
             ORDER BY id ASC \
             LIMIT $1 OFFSET $2"
        );
        let errors = sqlx::query_as::<_, StudioError>(&query)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(StudioErrorPage {
            errors,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            current_page: page,
            page_size,
        })
    }

    /// Delete one error entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM studio_errors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
