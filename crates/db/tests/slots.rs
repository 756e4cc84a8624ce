//! Integration tests for slot storage: generation-insert idempotency,
//! manual creation conflicts, updates and the cascading delete.

use assert_matches::assert_matches;
use atelier_core::booking::Kid;
use atelier_core::error::CoreError;
use atelier_db::error::RepoError;
use atelier_db::models::activity::{Activity, CreateActivity};
use atelier_db::models::record::BookingRequest;
use atelier_db::models::slot::{CreateManualSlot, NewGeneratedSlot, UpdateSlot};
use atelier_db::models::subscription::{CreateSubKid, CreateSubscription};
use atelier_db::models::subscription_type::CreateSubscriptionType;
use atelier_db::models::template::CreateTemplate;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    ActivityRepo, RecordRepo, SlotRepo, SubscriptionRepo, SubscriptionTypeRepo, TemplateRepo,
    UserRepo,
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_activity(pool: &PgPool, name: &str) -> Activity {
    ActivityRepo::create(
        pool,
        &CreateActivity {
            name: name.to_string(),
            description: None,
            price: 2000,
            duration_minutes: 45,
            is_regular: Some(true),
        },
    )
    .await
    .unwrap()
}

fn generated(activity_id: i64, template_id: i64, offset_days: i64) -> NewGeneratedSlot {
    let start_time = Utc::now() + Duration::days(offset_days);
    NewGeneratedSlot {
        activity_id,
        start_time,
        end_time: start_time + Duration::minutes(45),
        capacity: 10,
        template_id,
    }
}

// ---------------------------------------------------------------------------
// Test: generation inserts are idempotent
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_insert_generated_skips_existing_minute(pool: PgPool) {
    let activity = make_activity(&pool, "Pottery").await;
    let template = TemplateRepo::create(
        &pool,
        activity.id,
        &CreateTemplate {
            day_of_week: 1,
            start_time: "17:00".to_string(),
            capacity: Some(10),
        },
    )
    .await
    .unwrap();

    let new_slot = generated(activity.id, template.id, 3);
    let first = SlotRepo::insert_generated(&pool, &new_slot).await.unwrap();
    assert!(first.is_some());
    let slot = first.unwrap();
    assert_eq!(slot.template_id, Some(template.id));
    assert_eq!(slot.source, "template");
    assert_eq!(slot.booked, 0);

    // Same start again: skipped, not duplicated.
    let second = SlotRepo::insert_generated(&pool, &new_slot).await.unwrap();
    assert!(second.is_none());

    // A start a few seconds later still lands in the same minute
    // window and is also skipped.
    let mut nearby = new_slot.clone();
    nearby.start_time += Duration::seconds(30);
    nearby.end_time += Duration::seconds(30);
    let third = SlotRepo::insert_generated(&pool, &nearby).await.unwrap();
    assert!(third.is_none());

    assert_eq!(
        SlotRepo::list_by_activity(&pool, activity.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

// ---------------------------------------------------------------------------
// Test: manual slots
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_manual_slot_derives_end_time_and_rejects_duplicates(pool: PgPool) {
    let activity = make_activity(&pool, "Clay").await;
    let start_time = Utc::now() + Duration::days(2);

    let slot = SlotRepo::create_manual(
        &pool,
        &activity,
        &CreateManualSlot {
            start_time,
            capacity: 8,
        },
    )
    .await
    .unwrap();
    assert_eq!(slot.end_time - slot.start_time, Duration::minutes(45));
    assert_eq!(slot.source, "manual");

    let err = SlotRepo::create_manual(
        &pool,
        &activity,
        &CreateManualSlot {
            start_time,
            capacity: 8,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Conflict(_)));
}

#[sqlx::test]
async fn test_update_slot_shifts_end_time_with_start(pool: PgPool) {
    let activity = make_activity(&pool, "Painting").await;
    let slot = SlotRepo::create_manual(
        &pool,
        &activity,
        &CreateManualSlot {
            start_time: Utc::now() + Duration::days(1),
            capacity: 8,
        },
    )
    .await
    .unwrap();

    let new_start = slot.start_time + Duration::hours(2);
    let updated = SlotRepo::update(
        &pool,
        slot.id,
        &UpdateSlot {
            start_time: Some(new_start),
            capacity: Some(12),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.start_time, new_start);
    assert_eq!(updated.end_time - updated.start_time, Duration::minutes(45));
    assert_eq!(updated.capacity, 12);
    assert_eq!(updated.booked, 0);
}

// ---------------------------------------------------------------------------
// Test: cascading delete restores subscription visits
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_delete_cascade_removes_records_and_restores_visits(pool: PgPool) {
    let activity = make_activity(&pool, "Sculpting").await;
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            name: "Dana".to_string(),
            surname: None,
            phone_number: "+15550000020".to_string(),
        },
    )
    .await
    .unwrap();
    let slot = SlotRepo::create_manual(
        &pool,
        &activity,
        &CreateManualSlot {
            start_time: Utc::now() + Duration::days(1),
            capacity: 10,
        },
    )
    .await
    .unwrap();

    // One walk-in booking.
    RecordRepo::book(
        &pool,
        &user.phone_number,
        &BookingRequest {
            slot_id: slot.id,
            number_of_kids: 1,
            kids: vec![Kid {
                name: "Mira".to_string(),
                age: 6,
                gender: "f".to_string(),
            }],
        },
    )
    .await
    .unwrap();

    // One subscription-funded record, written the way the enrollment
    // engine writes it.
    let sub_type = SubscriptionTypeRepo::create(
        &pool,
        &CreateSubscriptionType {
            name: "8 visits".to_string(),
            activity_id: activity.id,
            price: 8000,
            visits_count: 8,
            duration_days: 60,
        },
    )
    .await
    .unwrap();
    let subscription = SubscriptionRepo::create_with_kids(
        &pool,
        &sub_type,
        &CreateSubscription {
            user_id: user.id,
            subscription_type_id: sub_type.id,
            start_date: Utc::now(),
            price_paid: 8000,
            kids: vec![CreateSubKid {
                name: "Noa".to_string(),
                age: 7,
                gender: "m".to_string(),
            }],
        },
    )
    .await
    .unwrap();
    let roster_kid = &subscription.kids[0];

    let mut tx = pool.begin().await.unwrap();
    let locked = SlotRepo::lock(&mut tx, slot.id).await.unwrap().unwrap();
    SlotRepo::insert_record(
        &mut tx,
        user.id,
        locked.id,
        Some(subscription.subscription.id),
        Some(roster_kid.id),
        &user.phone_number,
        &user.full_name(),
        1000,
        &atelier_db::models::record::RecordDetail {
            activity_id: activity.id,
            activity_name: activity.name.clone(),
            number_of_kids: 1,
            kids: vec![Kid {
                name: roster_kid.name.clone(),
                age: roster_kid.age,
                gender: roster_kid.gender.clone(),
            }],
            date: locked.start_time,
        },
    )
    .await
    .unwrap();
    SlotRepo::take_places(&mut tx, locked.id, 1).await.unwrap();
    SubscriptionRepo::consume_visit(&mut tx, subscription.subscription.id)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let summary = SlotRepo::delete_cascade(&pool, slot.id).await.unwrap();
    assert_eq!(summary.records_removed, 2);
    assert_eq!(summary.visits_restored, 1);

    assert!(SlotRepo::find_by_id(&pool, slot.id).await.unwrap().is_none());
    assert!(RecordRepo::list_by_slot(&pool, slot.id)
        .await
        .unwrap()
        .is_empty());
    let refreshed = SubscriptionRepo::find_by_id(&pool, subscription.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.visits_used, 0);
}

#[sqlx::test]
async fn test_delete_cascade_unknown_slot_is_not_found(pool: PgPool) {
    let err = SlotRepo::delete_cascade(&pool, 4242).await.unwrap_err();
    assert_matches!(
        err,
        RepoError::Core(CoreError::NotFound { entity: "Slot", .. })
    );
}
