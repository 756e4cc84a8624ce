//! Repository for the `schedule_templates` table.

use atelier_core::booking::{validate_template_day, DEFAULT_TEMPLATE_CAPACITY};
use atelier_core::error::CoreError;
use atelier_core::schedule::TemplateTime;
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::template::{CreateTemplate, ScheduleTemplate, UpdateTemplate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, activity_id, day_of_week, start_time, capacity, created_at, updated_at";

/// Provides CRUD operations for weekly schedule templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template under an activity.
    ///
    /// Validates the day range and `"HH:MM"` time before touching the
    /// database; a duplicate (activity, day, time) surfaces as a
    /// `Conflict`.
    pub async fn create(
        pool: &PgPool,
        activity_id: DbId,
        input: &CreateTemplate,
    ) -> Result<ScheduleTemplate, RepoError> {
        validate_template_day(input.day_of_week)?;
        TemplateTime::parse(&input.start_time)?;
        let capacity = input.capacity.unwrap_or(DEFAULT_TEMPLATE_CAPACITY);
        if capacity < 1 {
            return Err(CoreError::Validation("capacity must be at least 1".to_string()).into());
        }

        let existing: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM schedule_templates \
             WHERE activity_id = $1 AND day_of_week = $2 AND start_time = $3",
        )
        .bind(activity_id)
        .bind(input.day_of_week)
        .bind(&input.start_time)
        .fetch_optional(pool)
        .await?;
        if existing.is_some() {
            return Err(CoreError::Conflict(format!(
                "template for day {} at {} already exists",
                input.day_of_week, input.start_time
            ))
            .into());
        }

        let query = format!(
            "INSERT INTO schedule_templates (activity_id, day_of_week, start_time, capacity) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, ScheduleTemplate>(&query)
            .bind(activity_id)
            .bind(input.day_of_week)
            .bind(&input.start_time)
            .bind(capacity)
            .fetch_one(pool)
            .await?;
        Ok(template)
    }

    /// Find a template by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScheduleTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedule_templates WHERE id = $1");
        sqlx::query_as::<_, ScheduleTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all templates, ordered for stable operator display.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScheduleTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedule_templates \
             ORDER BY activity_id ASC, day_of_week ASC, start_time ASC"
        );
        sqlx::query_as::<_, ScheduleTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the templates of one activity.
    pub async fn list_by_activity(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<ScheduleTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedule_templates \
             WHERE activity_id = $1 \
             ORDER BY day_of_week ASC, start_time ASC"
        );
        sqlx::query_as::<_, ScheduleTemplate>(&query)
            .bind(activity_id)
            .fetch_all(pool)
            .await
    }

    /// Update a template. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<ScheduleTemplate>, RepoError> {
        if let Some(day) = input.day_of_week {
            validate_template_day(day)?;
        }
        if let Some(time) = &input.start_time {
            TemplateTime::parse(time)?;
        }

        let query = format!(
            "UPDATE schedule_templates SET \
                day_of_week = COALESCE($2, day_of_week), \
                start_time = COALESCE($3, start_time), \
                capacity = COALESCE($4, capacity), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, ScheduleTemplate>(&query)
            .bind(id)
            .bind(input.day_of_week)
            .bind(&input.start_time)
            .bind(input.capacity)
            .fetch_optional(pool)
            .await?;
        Ok(template)
    }

    /// Delete a template. Already-generated slots keep existing; their
    /// `template_id` is nulled by the storage layer. Returns `true` if
    /// a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedule_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
