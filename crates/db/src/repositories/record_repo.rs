//! Repository for the `records` table, including the booking and
//! cancellation transactions.
//!
//! Booking is the one place where the slot `booked` counter goes up
//! for walk-in customers, so the whole decision happens inside a
//! transaction that holds the slot row lock. Cancellation is the
//! mirror image, with the difference that it tolerates a world that
//! has drifted: a record may outlive its slot or its funding
//! subscription, and cancelling it must still succeed.

use atelier_core::booking::{booking_price, validate_kid_roster, Kid};
use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::record::{BookingRequest, Record, RecordDetail, RecordPage};
use crate::repositories::{ActivityRepo, SlotRepo, SubscriptionRepo, UserRepo};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, slot_id, subscription_id, sub_kid_id, \
    phone_number, parent_name, total_price, details, created_at";

/// Provides the booking transaction, cancellation, and record queries.
pub struct RecordRepo;

impl RecordRepo {
    /// Book one or more children into a slot for the client identified
    /// by `phone`.
    ///
    /// Fast-fails on an unlocked read (missing slot, past start,
    /// obviously full), then re-validates capacity and the duplicate
    /// child rule under the slot row lock before writing. Any error
    /// after the lock rolls the whole transaction back, so the
    /// `booked` counter and the record set never diverge.
    pub async fn book(
        pool: &PgPool,
        phone: &str,
        input: &BookingRequest,
    ) -> Result<Record, RepoError> {
        validate_kid_roster(input.number_of_kids, &input.kids)?;

        let slot = SlotRepo::find_by_id(pool, input.slot_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Slot", input.slot_id))?;
        if slot.start_time <= Utc::now() {
            return Err(
                CoreError::Validation("cannot book a slot that has already started".to_string())
                    .into(),
            );
        }
        if input.number_of_kids > slot.remaining() {
            return Err(CoreError::CapacityExceeded { slot_id: slot.id }.into());
        }
        let activity = ActivityRepo::find_by_id(pool, slot.activity_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Activity", slot.activity_id))?;
        let user = UserRepo::find_by_phone(pool, phone)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!("no user registered for phone {phone}"))
            })?;

        let mut tx = pool.begin().await?;

        let locked = SlotRepo::lock(&mut tx, slot.id)
            .await?
            .ok_or_else(|| RepoError::not_found("Slot", slot.id))?;
        if input.number_of_kids > locked.remaining() {
            return Err(CoreError::CapacityExceeded { slot_id: locked.id }.into());
        }
        for kid in &input.kids {
            if Self::kid_booked_in_slot(&mut tx, locked.id, kid).await? {
                return Err(CoreError::Conflict(format!(
                    "kid '{}' is already booked into this slot",
                    kid.name
                ))
                .into());
            }
        }
        SlotRepo::take_places(&mut tx, locked.id, input.number_of_kids).await?;

        let detail = RecordDetail {
            activity_id: activity.id,
            activity_name: activity.name.clone(),
            number_of_kids: input.number_of_kids,
            kids: input.kids.clone(),
            date: locked.start_time,
        };
        let record = SlotRepo::insert_record(
            &mut tx,
            user.id,
            locked.id,
            None,
            None,
            &user.phone_number,
            &user.full_name(),
            booking_price(activity.price, input.number_of_kids),
            &detail,
        )
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Cancel a record: delete it, give the places back to the slot
    /// and, for subscription-funded records, give the visit back.
    ///
    /// Degrades rather than fails when the slot or funding
    /// subscription no longer exists; each skipped restore is logged.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<(), RepoError> {
        let record = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RepoError::not_found("Record", id))?;

        let mut tx = pool.begin().await?;

        match SlotRepo::lock(&mut tx, record.slot_id).await? {
            Some(slot) => {
                SlotRepo::release_places(&mut tx, slot.id, record.details.number_of_kids).await?;
            }
            None => {
                tracing::warn!(
                    record_id = record.id,
                    slot_id = record.slot_id,
                    "slot missing, cancelling record without releasing places"
                );
            }
        }

        if let Some(sub_kid_id) = record.sub_kid_id {
            match SubscriptionRepo::lock_by_sub_kid(&mut tx, sub_kid_id).await? {
                Some(subscription) => {
                    SubscriptionRepo::restore_visit(&mut tx, subscription.id).await?;
                }
                None => {
                    tracing::warn!(
                        record_id = record.id,
                        sub_kid_id,
                        "funding subscription missing, cancelling record without restoring visit"
                    );
                }
            }
        }

        sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(record.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Find a record by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Record>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE id = $1");
        sqlx::query_as::<_, Record>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated record listing for operators, newest slot first, with
    /// an optional filter on the booked date (prefix match against the
    /// snapshotted ISO date, so `"2026-08"` selects a whole month).
    pub async fn list(
        pool: &PgPool,
        page: i64,
        page_size: i64,
        date_prefix: Option<&str>,
    ) -> Result<RecordPage, sqlx::Error> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;
        let pattern = date_prefix.map(|p| format!("{p}%"));

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM records \
             WHERE ($1::text IS NULL OR details->>'date' LIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM records \
             WHERE ($1::text IS NULL OR details->>'date' LIKE $1) \
             ORDER BY details->>'date' DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let records = sqlx::query_as::<_, Record>(&query)
            .bind(&pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(RecordPage {
            records,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            current_page: page,
            page_size,
        })
    }

    /// Paginated listing of one client's records, newest slot first.
    pub async fn list_by_phone(
        pool: &PgPool,
        phone: &str,
        page: i64,
        page_size: i64,
    ) -> Result<RecordPage, sqlx::Error> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE phone_number = $1")
                .bind(phone)
                .fetch_one(pool)
                .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM records \
             WHERE phone_number = $1 \
             ORDER BY details->>'date' DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let records = sqlx::query_as::<_, Record>(&query)
            .bind(phone)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(RecordPage {
            records,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            current_page: page,
            page_size,
        })
    }

    /// All records attached to a slot, oldest first.
    pub async fn list_by_slot(pool: &PgPool, slot_id: DbId) -> Result<Vec<Record>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE slot_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Record>(&query)
            .bind(slot_id)
            .fetch_all(pool)
            .await
    }

    /// Whether a record already books the given child into the slot.
    /// Matches on the full (name, age, gender) tuple inside the JSONB
    /// roster snapshot.
    pub async fn kid_booked_in_slot(
        conn: &mut PgConnection,
        slot_id: DbId,
        kid: &Kid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM records \
                WHERE slot_id = $1 \
                  AND details->'kids' @> jsonb_build_array(jsonb_build_object( \
                        'name', $2::text, 'age', $3::int, 'gender', $4::text)) \
             )",
        )
        .bind(slot_id)
        .bind(&kid.name)
        .bind(kid.age)
        .bind(&kid.gender)
        .fetch_one(&mut *conn)
        .await
    }

    /// Idempotency probe for the auto-enrollment engine: has this
    /// roster child already been enrolled into this slot?
    pub async fn exists_for_sub_kid(
        conn: &mut PgConnection,
        slot_id: DbId,
        sub_kid_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM records WHERE slot_id = $1 AND sub_kid_id = $2)",
        )
        .bind(slot_id)
        .bind(sub_kid_id)
        .fetch_one(&mut *conn)
        .await
    }
}
