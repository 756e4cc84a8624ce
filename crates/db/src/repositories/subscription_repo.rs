//! Repository for the `subscriptions`, `sub_kids` and
//! `subscription_kids` tables.
//!
//! `visits_used` follows the same discipline as the slot `booked`
//! counter: every write happens under a `FOR UPDATE` lock taken in the
//! caller's transaction, after re-checking the quota on the locked row.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use chrono::Duration;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::subscription::{
    CreateSubscription, EnrollmentCandidate, SubKid, Subscription, SubscriptionWithKids,
};
use crate::models::subscription_type::SubscriptionType;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, subscription_type_id, start_date, end_date, \
    visits_total, visits_used, price_paid, is_active, created_at, updated_at";

const KID_COLUMNS: &str = "id, name, age, gender, created_at, updated_at";

/// Provides subscription lifecycle operations and the lock-scoped
/// quota helpers used by booking, cancellation and auto-enrollment.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Purchase a subscription: insert the subscription row, its
    /// roster children and the join rows in one transaction.
    ///
    /// The visit quota and validity window are copied from the
    /// subscription type so later edits to the type never change a
    /// sold subscription.
    pub async fn create_with_kids(
        pool: &PgPool,
        sub_type: &SubscriptionType,
        input: &CreateSubscription,
    ) -> Result<SubscriptionWithKids, RepoError> {
        for kid in &input.kids {
            if kid.name.trim().is_empty() {
                return Err(CoreError::Validation("kid name must not be blank".to_string()).into());
            }
            if kid.age < 0 {
                return Err(CoreError::Validation(format!(
                    "kid '{}' has a negative age",
                    kid.name
                ))
                .into());
            }
        }
        let end_date = input.start_date + Duration::days(sub_type.duration_days as i64);

        let mut tx = pool.begin().await?;

        let sub_query = format!(
            "INSERT INTO subscriptions \
                (user_id, subscription_type_id, start_date, end_date, visits_total, visits_used, \
                 price_paid, is_active) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, TRUE) \
             RETURNING {COLUMNS}"
        );
        let subscription = sqlx::query_as::<_, Subscription>(&sub_query)
            .bind(input.user_id)
            .bind(sub_type.id)
            .bind(input.start_date)
            .bind(end_date)
            .bind(sub_type.visits_count)
            .bind(input.price_paid)
            .fetch_one(&mut *tx)
            .await?;

        let mut kids = Vec::with_capacity(input.kids.len());
        for kid in &input.kids {
            let kid_query = format!(
                "INSERT INTO sub_kids (name, age, gender) \
                 VALUES ($1, $2, $3) \
                 RETURNING {KID_COLUMNS}"
            );
            let sub_kid = sqlx::query_as::<_, SubKid>(&kid_query)
                .bind(&kid.name)
                .bind(kid.age)
                .bind(&kid.gender)
                .fetch_one(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO subscription_kids (subscription_id, sub_kid_id) VALUES ($1, $2)",
            )
            .bind(subscription.id)
            .bind(sub_kid.id)
            .execute(&mut *tx)
            .await?;
            kids.push(sub_kid);
        }

        tx.commit().await?;
        Ok(SubscriptionWithKids { subscription, kids })
    }

    /// Find a subscription by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a subscription together with its roster children.
    pub async fn find_with_kids(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubscriptionWithKids>, sqlx::Error> {
        let Some(subscription) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let kids = Self::kids_for(pool, subscription.id).await?;
        Ok(Some(SubscriptionWithKids { subscription, kids }))
    }

    /// List all subscriptions with their roster children, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SubscriptionWithKids>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY id ASC");
        let subscriptions = sqlx::query_as::<_, Subscription>(&query)
            .fetch_all(pool)
            .await?;

        let mut out = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let kids = Self::kids_for(pool, subscription.id).await?;
            out.push(SubscriptionWithKids { subscription, kids });
        }
        Ok(out)
    }

    /// List a user's subscriptions with their roster children.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SubscriptionWithKids>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY id ASC");
        let subscriptions = sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        let mut out = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let kids = Self::kids_for(pool, subscription.id).await?;
            out.push(SubscriptionWithKids { subscription, kids });
        }
        Ok(out)
    }

    /// The roster children of a subscription, oldest first.
    pub async fn kids_for(pool: &PgPool, subscription_id: DbId) -> Result<Vec<SubKid>, sqlx::Error> {
        sqlx::query_as::<_, SubKid>(
            "SELECT k.id, k.name, k.age, k.gender, k.created_at, k.updated_at \
             FROM sub_kids k \
             JOIN subscription_kids sk ON sk.sub_kid_id = k.id \
             WHERE sk.subscription_id = $1 \
             ORDER BY k.id ASC",
        )
        .bind(subscription_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a subscription and its join rows. The `sub_kids` rows
    /// stay so historical records keep resolving their child. Returns
    /// `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM subscription_kids WHERE subscription_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unlocked candidate scan for the auto-enrollment engine: active
    /// subscriptions targeting the activity with quota apparently
    /// left, oldest first so enrollment order is deterministic.
    pub async fn find_enrollable(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<EnrollmentCandidate>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentCandidate>(
            "SELECT s.id, s.user_id, s.visits_total, s.visits_used, s.price_paid, \
                    u.phone_number, \
                    TRIM(u.name || ' ' || u.surname) AS parent_name, \
                    a.name AS activity_name \
             FROM subscriptions s \
             JOIN subscription_types st ON st.id = s.subscription_type_id \
             JOIN users u ON u.id = s.user_id \
             JOIN activities a ON a.id = st.activity_id \
             WHERE st.activity_id = $1 \
               AND s.is_active = TRUE \
               AND s.visits_used < s.visits_total \
             ORDER BY s.id ASC",
        )
        .bind(activity_id)
        .fetch_all(pool)
        .await
    }

    // Lock-scoped helpers. These take the caller's open transaction.

    /// Acquire an exclusive row lock on a subscription. Quota
    /// decisions must be made against the row this returns.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lock the subscription that funds a given roster child. Used by
    /// cancellation paths, which only know the record's `sub_kid_id`.
    pub async fn lock_by_sub_kid(
        conn: &mut PgConnection,
        sub_kid_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT s.id, s.user_id, s.subscription_type_id, s.start_date, s.end_date, \
                    s.visits_total, s.visits_used, s.price_paid, s.is_active, \
                    s.created_at, s.updated_at \
             FROM subscriptions s \
             JOIN subscription_kids sk ON sk.subscription_id = s.id \
             WHERE sk.sub_kid_id = $1 \
             FOR UPDATE OF s",
        )
        .bind(sub_kid_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Consume one visit. Only call after `lock` confirmed
    /// `visits_used < visits_total` in the same transaction; an
    /// exhausted row is rejected with `QuotaExhausted` all the same.
    pub async fn consume_visit(conn: &mut PgConnection, id: DbId) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE subscriptions SET visits_used = visits_used + 1, updated_at = NOW() \
             WHERE id = $1 AND visits_used < visits_total",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::QuotaExhausted {
                subscription_id: id,
            }
            .into());
        }
        Ok(())
    }

    /// Give one visit back, clamped at zero.
    pub async fn restore_visit(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE subscriptions \
             SET visits_used = GREATEST(visits_used - 1, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
