//! Integration tests for the booking transaction.
//!
//! Exercises the capacity invariant, the duplicate-child rule,
//! cancellation round-trips and degraded cancellation against a real
//! database.

use assert_matches::assert_matches;
use atelier_core::booking::Kid;
use atelier_core::error::CoreError;
use atelier_db::error::RepoError;
use atelier_db::models::activity::{Activity, CreateActivity};
use atelier_db::models::record::{BookingRequest, Record, RecordDetail};
use atelier_db::models::slot::{ActivitySlot, CreateManualSlot};
use atelier_db::models::subscription::{CreateSubKid, CreateSubscription, SubscriptionWithKids};
use atelier_db::models::subscription_type::CreateSubscriptionType;
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::{
    ActivityRepo, RecordRepo, SlotRepo, SubscriptionRepo, SubscriptionTypeRepo, UserRepo,
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
            price: 1500,
            duration_minutes: 60,
            is_regular: Some(true),
        },
    )
    .await
    .unwrap()
}

async fn make_user(pool: &PgPool, phone: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Dana".to_string(),
            surname: Some("Reyes".to_string()),
            phone_number: phone.to_string(),
        },
    )
    .await
    .unwrap()
}

async fn make_slot(pool: &PgPool, activity: &Activity, capacity: i32) -> ActivitySlot {
    SlotRepo::create_manual(
        pool,
        activity,
        &CreateManualSlot {
            start_time: Utc::now() + Duration::days(1),
            capacity,
        },
    )
    .await
    .unwrap()
}

fn kid(name: &str) -> Kid {
    Kid {
        name: name.to_string(),
        age: 6,
        gender: "f".to_string(),
    }
}

fn booking(slot_id: i64, kids: Vec<Kid>) -> BookingRequest {
    BookingRequest {
        slot_id,
        number_of_kids: kids.len() as i32,
        kids,
    }
}

// ---------------------------------------------------------------------------
// Test: booking increments the counter and snapshots details
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_book_takes_places_and_snapshots_details(pool: PgPool) {
    let activity = make_activity(&pool, "Pottery").await;
    let user = make_user(&pool, "+15550000001").await;
    let slot = make_slot(&pool, &activity, 5).await;

    let record = RecordRepo::book(
        &pool,
        &user.phone_number,
        &booking(slot.id, vec![kid("Mira"), kid("Ila")]),
    )
    .await
    .unwrap();

    assert_eq!(record.user_id, user.id);
    assert_eq!(record.parent_name, "Dana Reyes");
    assert_eq!(record.total_price, 3000); // 1500 per kid
    assert_eq!(record.subscription_id, None);
    assert_eq!(record.details.activity_name, "Pottery");
    assert_eq!(record.details.number_of_kids, 2);
    assert_eq!(record.details.date, slot.start_time);

    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 2);
}

// ---------------------------------------------------------------------------
// Test: capacity is never oversold
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_book_rejects_when_slot_is_full(pool: PgPool) {
    let activity = make_activity(&pool, "Clay").await;
    make_user(&pool, "+15550000002").await;
    let slot = make_slot(&pool, &activity, 2).await;

    RecordRepo::book(
        &pool,
        "+15550000002",
        &booking(slot.id, vec![kid("Mira"), kid("Ila")]),
    )
    .await
    .unwrap();

    let err = RecordRepo::book(&pool, "+15550000002", &booking(slot.id, vec![kid("Noa")]))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        RepoError::Core(CoreError::CapacityExceeded { slot_id }) if slot_id == slot.id
    );

    // The failed attempt must not have moved the counter.
    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 2);
}

#[sqlx::test]
async fn test_concurrent_bookings_do_not_oversell(pool: PgPool) {
    let activity = make_activity(&pool, "Sculpting").await;
    make_user(&pool, "+15550000003").await;
    make_user(&pool, "+15550000004").await;
    let slot = make_slot(&pool, &activity, 1).await;

    let req_a = booking(slot.id, vec![kid("Mira")]);
    let req_b = booking(slot.id, vec![kid("Noa")]);
    let (a, b) = tokio::join!(
        RecordRepo::book(&pool, "+15550000003", &req_a),
        RecordRepo::book(&pool, "+15550000004", &req_b),
    );

    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one of two competing bookings must win"
    );
    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 1);
}

// ---------------------------------------------------------------------------
// Test: duplicate child rule
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_book_rejects_duplicate_child(pool: PgPool) {
    let activity = make_activity(&pool, "Painting").await;
    make_user(&pool, "+15550000005").await;
    let slot = make_slot(&pool, &activity, 10).await;

    RecordRepo::book(&pool, "+15550000005", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap();

    let err = RecordRepo::book(&pool, "+15550000005", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        RepoError::Core(CoreError::Conflict(msg)) if msg.contains("Mira")
    );

    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 1);
}

#[sqlx::test]
async fn test_same_name_different_age_is_a_different_child(pool: PgPool) {
    let activity = make_activity(&pool, "Drawing").await;
    make_user(&pool, "+15550000006").await;
    let slot = make_slot(&pool, &activity, 10).await;

    RecordRepo::book(&pool, "+15550000006", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap();

    let older = Kid {
        name: "Mira".to_string(),
        age: 9,
        gender: "f".to_string(),
    };
    RecordRepo::book(&pool, "+15550000006", &booking(slot.id, vec![older]))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: pre-checks
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_book_rejects_past_slot(pool: PgPool) {
    let activity = make_activity(&pool, "History").await;
    make_user(&pool, "+15550000007").await;
    let slot = SlotRepo::create_manual(
        &pool,
        &activity,
        &CreateManualSlot {
            start_time: Utc::now() - Duration::hours(1),
            capacity: 5,
        },
    )
    .await
    .unwrap();

    let err = RecordRepo::book(&pool, "+15550000007", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
}

#[sqlx::test]
async fn test_book_rejects_unknown_phone(pool: PgPool) {
    let activity = make_activity(&pool, "Weaving").await;
    let slot = make_slot(&pool, &activity, 5).await;

    let err = RecordRepo::book(&pool, "+15559999999", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
}

#[sqlx::test]
async fn test_book_rejects_roster_mismatch(pool: PgPool) {
    let activity = make_activity(&pool, "Collage").await;
    make_user(&pool, "+15550000008").await;
    let slot = make_slot(&pool, &activity, 5).await;

    let err = RecordRepo::book(
        &pool,
        "+15550000008",
        &BookingRequest {
            slot_id: slot.id,
            number_of_kids: 2,
            kids: vec![kid("Mira")],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Test: cancellation
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_cancel_releases_places(pool: PgPool) {
    let activity = make_activity(&pool, "Mosaics").await;
    make_user(&pool, "+15550000009").await;
    let slot = make_slot(&pool, &activity, 5).await;

    let record = RecordRepo::book(
        &pool,
        "+15550000009",
        &booking(slot.id, vec![kid("Mira"), kid("Ila")]),
    )
    .await
    .unwrap();

    RecordRepo::cancel(&pool, record.id).await.unwrap();

    assert!(RecordRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 0);
}

#[sqlx::test]
async fn test_cancel_survives_missing_slot(pool: PgPool) {
    let activity = make_activity(&pool, "Prints").await;
    make_user(&pool, "+15550000010").await;
    let slot = make_slot(&pool, &activity, 5).await;

    let record = RecordRepo::book(&pool, "+15550000010", &booking(slot.id, vec![kid("Mira")]))
        .await
        .unwrap();

    // Simulate a slot removed outside the cascade path.
    sqlx::query("DELETE FROM activity_slots WHERE id = $1")
        .bind(slot.id)
        .execute(&pool)
        .await
        .unwrap();

    RecordRepo::cancel(&pool, record.id).await.unwrap();
    assert!(RecordRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
}

/// A record written the way the enrollment engine writes it: funded by
/// a one-child subscription, with the visit already consumed.
async fn make_funded_record(
    pool: &PgPool,
    activity: &Activity,
    user: &User,
    slot: &ActivitySlot,
) -> (SubscriptionWithKids, Record) {
    let sub_type = SubscriptionTypeRepo::create(
        pool,
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
        pool,
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
    let record = SlotRepo::insert_record(
        &mut tx,
        user.id,
        locked.id,
        Some(subscription.subscription.id),
        Some(roster_kid.id),
        &user.phone_number,
        &user.full_name(),
        1000,
        &RecordDetail {
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
    (subscription, record)
}

#[sqlx::test]
async fn test_cancel_restores_subscription_visit(pool: PgPool) {
    let activity = make_activity(&pool, "Textiles").await;
    let user = make_user(&pool, "+15550000011").await;
    let slot = make_slot(&pool, &activity, 5).await;
    let (subscription, record) = make_funded_record(&pool, &activity, &user, &slot).await;

    let before = SubscriptionRepo::find_by_id(&pool, subscription.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.visits_used, 1);

    RecordRepo::cancel(&pool, record.id).await.unwrap();

    let after = SubscriptionRepo::find_by_id(&pool, subscription.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.visits_used, 0);
    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 0);
    assert!(RecordRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn test_cancel_survives_missing_subscription(pool: PgPool) {
    let activity = make_activity(&pool, "Collage prints").await;
    let user = make_user(&pool, "+15550000012").await;
    let slot = make_slot(&pool, &activity, 5).await;
    let (subscription, record) = make_funded_record(&pool, &activity, &user, &slot).await;

    // The funding subscription disappears before the cancellation.
    assert!(SubscriptionRepo::delete(&pool, subscription.subscription.id)
        .await
        .unwrap());

    RecordRepo::cancel(&pool, record.id).await.unwrap();

    assert!(RecordRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
    let slot = SlotRepo::find_by_id(&pool, slot.id).await.unwrap().unwrap();
    assert_eq!(slot.booked, 0);
}

#[sqlx::test]
async fn test_cancel_unknown_record_is_not_found(pool: PgPool) {
    let err = RecordRepo::cancel(&pool, 12345).await.unwrap_err();
    assert_matches!(
        err,
        RepoError::Core(CoreError::NotFound { entity: "Record", .. })
    );
}
