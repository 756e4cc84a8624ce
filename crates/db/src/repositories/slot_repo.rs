//! Repository for the `activity_slots` table.
//!
//! The `booked` counter is the single gate for accepting bookings.
//! Every write to it goes through the lock-scoped helpers at the
//! bottom of this file, inside a transaction that first acquired the
//! row with `FOR UPDATE` and re-validated `booked <= capacity`.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use chrono::Duration;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::activity::Activity;
use crate::models::record::{Record, RecordDetail};
use crate::models::slot::{
    ActivitySlot, CreateManualSlot, NewGeneratedSlot, SlotCascadeSummary, UpdateSlot,
    SOURCE_MANUAL, SOURCE_TEMPLATE,
};
use crate::repositories::SubscriptionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, activity_id, start_time, end_time, capacity, booked, \
    template_id, source, created_at, updated_at";

/// Provides slot CRUD, idempotent generation inserts, and the
/// lock-scoped capacity helpers used by every booking path.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a one-off slot created by an operator.
    ///
    /// `end_time` is derived from the owning activity's duration. A
    /// slot already occupying the same (activity, start) minute is a
    /// conflict.
    pub async fn create_manual(
        pool: &PgPool,
        activity: &Activity,
        input: &CreateManualSlot,
    ) -> Result<ActivitySlot, RepoError> {
        if input.capacity < 1 {
            return Err(CoreError::Validation("capacity must be at least 1".to_string()).into());
        }
        let end_time = input.start_time + Duration::minutes(activity.duration_minutes as i64);

        let query = format!(
            "INSERT INTO activity_slots (activity_id, start_time, end_time, capacity, booked, source) \
             VALUES ($1, $2, $3, $4, 0, $5) \
             ON CONFLICT ON CONSTRAINT uq_slots_activity_start DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let slot = sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(activity.id)
            .bind(input.start_time)
            .bind(end_time)
            .bind(input.capacity)
            .bind(SOURCE_MANUAL)
            .fetch_optional(pool)
            .await?;

        slot.ok_or_else(|| {
            CoreError::Conflict(format!(
                "a slot for activity {} at {} already exists",
                activity.id, input.start_time
            ))
            .into()
        })
    }

    /// Idempotent insert used by the schedule generator.
    ///
    /// Returns `None` without writing when a slot for the same
    /// activity already starts inside `[start, start + 1min)`, or when
    /// the storage-level uniqueness constraint fires (the race window
    /// between the two checks).
    pub async fn insert_generated(
        pool: &PgPool,
        new: &NewGeneratedSlot,
    ) -> Result<Option<ActivitySlot>, sqlx::Error> {
        let minute_end = new.start_time + Duration::minutes(1);
        let existing: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM activity_slots \
             WHERE activity_id = $1 AND start_time >= $2 AND start_time < $3",
        )
        .bind(new.activity_id)
        .bind(new.start_time)
        .bind(minute_end)
        .fetch_optional(pool)
        .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO activity_slots \
                (activity_id, start_time, end_time, capacity, booked, template_id, source) \
             VALUES ($1, $2, $3, $4, 0, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_slots_activity_start DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(new.activity_id)
            .bind(new.start_time)
            .bind(new.end_time)
            .bind(new.capacity)
            .bind(new.template_id)
            .bind(SOURCE_TEMPLATE)
            .fetch_optional(pool)
            .await
    }

    /// Find a slot by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ActivitySlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activity_slots WHERE id = $1");
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the bookable slots of an activity: future start, places
    /// left. Advisory only; the authoritative capacity check happens
    /// under the row lock at booking time.
    pub async fn list_available(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<ActivitySlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_slots \
             WHERE activity_id = $1 AND start_time > NOW() AND booked < capacity \
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(activity_id)
            .fetch_all(pool)
            .await
    }

    /// List every slot of an activity inside a start-time window.
    pub async fn list_by_activity(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<ActivitySlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_slots \
             WHERE activity_id = $1 \
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(activity_id)
            .fetch_all(pool)
            .await
    }

    /// Rewrite a slot's start time and/or capacity. The `booked`
    /// counter never moves through this path; `end_time` shifts with
    /// the start so the duration is preserved.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSlot,
    ) -> Result<Option<ActivitySlot>, sqlx::Error> {
        let query = format!(
            "UPDATE activity_slots SET \
                start_time = COALESCE($2, start_time), \
                end_time = COALESCE($2, start_time) + (end_time - start_time), \
                capacity = COALESCE($3, capacity), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(id)
            .bind(input.start_time)
            .bind(input.capacity)
            .fetch_optional(pool)
            .await
    }

    /// Delete a slot together with its live records, restoring one
    /// subscription visit per subscription-funded record, all in a
    /// single transaction.
    ///
    /// A record whose funding subscription has since vanished is still
    /// removed; the missing restore is logged and counted nowhere.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<SlotCascadeSummary, RepoError> {
        let mut tx = pool.begin().await?;

        let slot = Self::lock(&mut tx, id)
            .await?
            .ok_or_else(|| RepoError::not_found("Slot", id))?;

        let record_query = format!(
            "SELECT {} FROM records WHERE slot_id = $1 ORDER BY id ASC",
            crate::repositories::record_repo::COLUMNS
        );
        let records = sqlx::query_as::<_, Record>(&record_query)
            .bind(slot.id)
            .fetch_all(&mut *tx)
            .await?;

        let mut summary = SlotCascadeSummary::default();
        for record in &records {
            if let Some(sub_kid_id) = record.sub_kid_id {
                match SubscriptionRepo::lock_by_sub_kid(&mut tx, sub_kid_id).await? {
                    Some(subscription) => {
                        SubscriptionRepo::restore_visit(&mut tx, subscription.id).await?;
                        summary.visits_restored += 1;
                    }
                    None => {
                        tracing::warn!(
                            record_id = record.id,
                            sub_kid_id,
                            "funding subscription missing, deleting record without restoring visit"
                        );
                    }
                }
            }
            sqlx::query("DELETE FROM records WHERE id = $1")
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
            summary.records_removed += 1;
        }

        sqlx::query("DELETE FROM activity_slots WHERE id = $1")
            .bind(slot.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(summary)
    }

    // Lock-scoped helpers. These take the caller's open transaction.

    /// Acquire an exclusive row lock on a slot within the caller's
    /// transaction. All capacity decisions must be made against the
    /// row this returns, not against any earlier unlocked read.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ActivitySlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activity_slots WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ActivitySlot>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Increment `booked`. Only call after `lock` confirmed
    /// `booked + places <= capacity` in the same transaction.
    pub async fn take_places(
        conn: &mut PgConnection,
        id: DbId,
        places: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE activity_slots SET booked = booked + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(places)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Decrement `booked`, clamped at zero.
    pub async fn release_places(
        conn: &mut PgConnection,
        id: DbId,
        places: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE activity_slots \
             SET booked = GREATEST(booked - $2, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(places)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Record insert helper for the booking and auto-enrollment
    /// transactions: all fields explicit, caller owns the transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_record(
        conn: &mut PgConnection,
        user_id: DbId,
        slot_id: DbId,
        subscription_id: Option<DbId>,
        sub_kid_id: Option<DbId>,
        phone_number: &str,
        parent_name: &str,
        total_price: i32,
        detail: &RecordDetail,
    ) -> Result<Record, sqlx::Error> {
        let query = format!(
            "INSERT INTO records \
                (user_id, slot_id, subscription_id, sub_kid_id, phone_number, parent_name, \
                 total_price, details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            crate::repositories::record_repo::COLUMNS
        );
        sqlx::query_as::<_, Record>(&query)
            .bind(user_id)
            .bind(slot_id)
            .bind(subscription_id)
            .bind(sub_kid_id)
            .bind(phone_number)
            .bind(parent_name)
            .bind(total_price)
            .bind(sqlx::types::Json(detail))
            .fetch_one(&mut *conn)
            .await
    }
}
