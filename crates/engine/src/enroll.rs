//! Auto-enrollment of subscription children into a slot.
//!
//! Two-phase pattern: an unlocked scan narrows the candidate set, then
//! each enrollment runs in its own short transaction that locks the
//! slot and then the subscription (the same lock order as the
//! cancellation paths), re-checks capacity, quota and the idempotency
//! probe on the locked rows, and writes the record plus both counter
//! increments atomically. A crash between children loses nothing and
//! double-books nothing.
//!
//! Children that could not be placed are logged to the studio error
//! table for admin review.

use atelier_core::booking::{per_visit_price, Kid};
use atelier_core::types::DbId;
use atelier_db::error::RepoError;
use atelier_db::models::record::RecordDetail;
use atelier_db::models::slot::ActivitySlot;
use atelier_db::models::subscription::{EnrollmentCandidate, SubKid};
use atelier_db::repositories::{RecordRepo, SlotRepo, StudioErrorRepo, SubscriptionRepo};
use atelier_db::DbPool;

/// Outcome of one attempted child enrollment.
enum Attempt {
    Enrolled,
    /// Child already has a record in this slot, or the subscription
    /// ran out of quota under the lock.
    Skipped,
    /// The slot is full (or gone); stop enrolling into it entirely.
    SlotClosed,
}

/// Fill a slot from the active subscriptions targeting its activity.
///
/// Children are taken in subscription purchase order until the slot
/// fills or candidates run out. A failure while enrolling one child is
/// logged and the next child is tried; the count of successful
/// enrollments is returned either way.
pub async fn auto_enroll_slot(
    pool: &DbPool,
    activity_id: DbId,
    slot: &ActivitySlot,
) -> Result<u32, sqlx::Error> {
    let candidates = SubscriptionRepo::find_enrollable(pool, activity_id).await?;
    if candidates.is_empty() {
        return Ok(0);
    }

    let mut enrolled = 0u32;
    'candidates: for candidate in &candidates {
        let kids = SubscriptionRepo::kids_for(pool, candidate.id).await?;
        for kid in &kids {
            match enroll_kid(pool, candidate, kid, slot).await {
                Ok(Attempt::Enrolled) => enrolled += 1,
                Ok(Attempt::Skipped) => {}
                Ok(Attempt::SlotClosed) => {
                    report_failure(
                        pool,
                        candidate.id,
                        slot.id,
                        &format!("no places left for child '{}'", kid.name),
                    )
                    .await;
                    break 'candidates;
                }
                Err(err) => {
                    tracing::warn!(
                        subscription_id = candidate.id,
                        sub_kid_id = kid.id,
                        slot_id = slot.id,
                        error = %err,
                        "auto-enrollment of one child failed, continuing"
                    );
                    report_failure(
                        pool,
                        candidate.id,
                        slot.id,
                        &format!("enrollment failed for child '{}': {err}", kid.name),
                    )
                    .await;
                }
            }
        }
    }

    if enrolled > 0 {
        tracing::info!(slot_id = slot.id, activity_id, enrolled, "auto-enrolled slot");
    }
    Ok(enrolled)
}

/// Enroll a single child inside its own transaction.
async fn enroll_kid(
    pool: &DbPool,
    candidate: &EnrollmentCandidate,
    kid: &SubKid,
    slot: &ActivitySlot,
) -> Result<Attempt, RepoError> {
    let mut tx = pool.begin().await?;

    let locked_slot = match SlotRepo::lock(&mut tx, slot.id).await? {
        Some(s) => s,
        None => return Ok(Attempt::SlotClosed),
    };
    if locked_slot.remaining() < 1 {
        return Ok(Attempt::SlotClosed);
    }

    // Quota re-check on the locked subscription row. A candidate that
    // was exhausted by a concurrent booking is silently skipped.
    let subscription = match SubscriptionRepo::lock(&mut tx, candidate.id).await? {
        Some(s) if !s.is_exhausted() && s.is_active => s,
        _ => return Ok(Attempt::Skipped),
    };

    if RecordRepo::exists_for_sub_kid(&mut tx, slot.id, kid.id).await? {
        return Ok(Attempt::Skipped);
    }

    let detail = RecordDetail {
        activity_id: locked_slot.activity_id,
        activity_name: candidate.activity_name.clone(),
        number_of_kids: 1,
        kids: vec![Kid {
            name: kid.name.clone(),
            age: kid.age,
            gender: kid.gender.clone(),
        }],
        date: locked_slot.start_time,
    };
    SlotRepo::insert_record(
        &mut tx,
        candidate.user_id,
        locked_slot.id,
        Some(subscription.id),
        Some(kid.id),
        &candidate.phone_number,
        &candidate.parent_name,
        per_visit_price(candidate.price_paid, subscription.visits_total),
        &detail,
    )
    .await?;
    SlotRepo::take_places(&mut tx, locked_slot.id, 1).await?;
    SubscriptionRepo::consume_visit(&mut tx, subscription.id).await?;

    tx.commit().await?;
    Ok(Attempt::Enrolled)
}

/// Best-effort write to the studio error log; never fails the walk.
async fn report_failure(pool: &DbPool, subscription_id: DbId, slot_id: DbId, info: &str) {
    if let Err(err) = StudioErrorRepo::record(pool, subscription_id, slot_id, info).await {
        tracing::warn!(
            subscription_id,
            slot_id,
            error = %err,
            "failed to persist studio error"
        );
    }
}
