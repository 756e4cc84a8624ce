//! Integration tests for schedule generation and auto-enrollment.

use atelier_db::models::activity::{Activity, CreateActivity};
use atelier_db::models::slot::ActivitySlot;
use atelier_db::models::subscription::{CreateSubKid, CreateSubscription, SubscriptionWithKids};
use atelier_db::models::subscription_type::CreateSubscriptionType;
use atelier_db::models::template::CreateTemplate;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    ActivityRepo, RecordRepo, SlotRepo, StudioErrorRepo, SubscriptionRepo, SubscriptionTypeRepo,
    TemplateRepo, UserRepo,
};
use atelier_engine::{auto_enroll_slot, extend_schedule};
use chrono::Utc;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_activity(pool: &PgPool, name: &str, is_regular: bool) -> Activity {
    ActivityRepo::create(
        pool,
        &CreateActivity {
            name: name.to_string(),
            description: None,
            price: 1500,
            duration_minutes: 60,
            is_regular: Some(is_regular),
        },
    )
    .await
    .unwrap()
}

async fn make_template(pool: &PgPool, activity_id: i64, day: i16, time: &str, capacity: i32) {
    TemplateRepo::create(
        pool,
        activity_id,
        &CreateTemplate {
            day_of_week: day,
            start_time: time.to_string(),
            capacity: Some(capacity),
        },
    )
    .await
    .unwrap();
}

/// A user plus an active subscription for `activity_id` with the given
/// roster children.
async fn make_subscription(
    pool: &PgPool,
    activity_id: i64,
    phone: &str,
    visits: i32,
    kid_names: &[&str],
) -> SubscriptionWithKids {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Dana".to_string(),
            surname: Some("Reyes".to_string()),
            phone_number: phone.to_string(),
        },
    )
    .await
    .unwrap();
    let sub_type = SubscriptionTypeRepo::create(
        pool,
        &CreateSubscriptionType {
            name: format!("{visits} visits"),
            activity_id,
            price: visits * 1000,
            visits_count: visits,
            duration_days: 90,
        },
    )
    .await
    .unwrap();
    SubscriptionRepo::create_with_kids(
        pool,
        &sub_type,
        &CreateSubscription {
            user_id: user.id,
            subscription_type_id: sub_type.id,
            start_date: Utc::now(),
            price_paid: visits * 1000,
            kids: kid_names
                .iter()
                .map(|name| CreateSubKid {
                    name: name.to_string(),
                    age: 6,
                    gender: "f".to_string(),
                })
                .collect(),
        },
    )
    .await
    .unwrap()
}

async fn slots_of(pool: &PgPool, activity_id: i64) -> Vec<ActivitySlot> {
    SlotRepo::list_by_activity(pool, activity_id).await.unwrap()
}

// ---------------------------------------------------------------------------
// Test: generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_one_week_window_creates_one_slot_per_template(pool: PgPool) {
    let activity = make_activity(&pool, "Pottery", true).await;
    make_template(&pool, activity.id, 1, "17:00", 15).await;
    make_template(&pool, activity.id, 3, "10:30", 15).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 2);
    assert_eq!(summary.slots_skipped, 0);

    let slots = slots_of(&pool, activity.id).await;
    assert_eq!(slots.len(), 2);
    for slot in &slots {
        assert!(slot.start_time > Utc::now());
        assert_eq!(slot.end_time - slot.start_time, chrono::Duration::minutes(60));
        assert_eq!(slot.capacity, 15);
        assert_eq!(slot.booked, 0);
        assert_eq!(slot.source, "template");
        assert!(slot.template_id.is_some());
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rerun_creates_nothing_new(pool: PgPool) {
    let activity = make_activity(&pool, "Clay", true).await;
    make_template(&pool, activity.id, 2, "09:00", 8).await;

    let first = extend_schedule(&pool, 2).await.unwrap();
    assert_eq!(first.slots_created, 2);

    let second = extend_schedule(&pool, 2).await.unwrap();
    assert_eq!(second.slots_created, 0);
    assert_eq!(second.slots_skipped, 2);
    assert_eq!(slots_of(&pool, activity.id).await.len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_out_of_range_weeks_fall_back_to_one(pool: PgPool) {
    let activity = make_activity(&pool, "Painting", true).await;
    make_template(&pool, activity.id, 4, "15:00", 10).await;

    let summary = extend_schedule(&pool, 99).await.unwrap();
    assert_eq!(summary.slots_created, 1);

    let summary = extend_schedule(&pool, 0).await.unwrap();
    assert_eq!(summary.slots_created, 0);
    assert_eq!(summary.slots_skipped, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_regular_activities_are_ignored(pool: PgPool) {
    let activity = make_activity(&pool, "One-off workshop", false).await;
    make_template(&pool, activity.id, 1, "17:00", 10).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 0);
    assert!(slots_of(&pool, activity.id).await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: auto-enrollment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_generated_slots_enroll_subscription_children(pool: PgPool) {
    let activity = make_activity(&pool, "Sculpting", true).await;
    make_template(&pool, activity.id, 1, "17:00", 10).await;
    let subscription =
        make_subscription(&pool, activity.id, "+15550000040", 8, &["Mira", "Noa"]).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 1);
    assert_eq!(summary.enrollments, 2);

    let slots = slots_of(&pool, activity.id).await;
    assert_eq!(slots[0].booked, 2);

    let records = RecordRepo::list_by_slot(&pool, slots[0].id).await.unwrap();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(record.subscription_id, Some(subscription.subscription.id));
        assert!(record.sub_kid_id.is_some());
        assert_eq!(record.details.number_of_kids, 1);
        assert_eq!(record.total_price, 1000); // price_paid / visits_total
    }

    let refreshed = SubscriptionRepo::find_by_id(&pool, subscription.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.visits_used, 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_exhausted_subscription_is_not_enrolled(pool: PgPool) {
    let activity = make_activity(&pool, "Drawing", true).await;
    make_template(&pool, activity.id, 2, "11:00", 10).await;
    let subscription = make_subscription(&pool, activity.id, "+15550000041", 1, &["Mira"]).await;

    sqlx::query("UPDATE subscriptions SET visits_used = visits_total WHERE id = $1")
        .bind(subscription.subscription.id)
        .execute(&pool)
        .await
        .unwrap();

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 1);
    assert_eq!(summary.enrollments, 0);
    assert_eq!(slots_of(&pool, activity.id).await[0].booked, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_enrollment_stops_at_capacity(pool: PgPool) {
    let activity = make_activity(&pool, "Mosaics", true).await;
    make_template(&pool, activity.id, 3, "16:00", 1).await;
    let subscription =
        make_subscription(&pool, activity.id, "+15550000042", 8, &["Mira", "Noa"]).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 1);
    assert_eq!(summary.enrollments, 1);

    let slots = slots_of(&pool, activity.id).await;
    assert_eq!(slots[0].booked, 1);
    assert_eq!(slots[0].capacity, 1);

    // The child who missed out is reported to the studio error log.
    let errors = StudioErrorRepo::list(&pool, 1, 10).await.unwrap();
    assert_eq!(errors.total_count, 1);
    assert_eq!(errors.errors[0].subscription_id, subscription.subscription.id);
    assert_eq!(errors.errors[0].slot_id, slots[0].id);
    assert!(errors.errors[0].info.contains("Noa"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_enrollment_is_idempotent_per_child(pool: PgPool) {
    let activity = make_activity(&pool, "Prints", true).await;
    make_template(&pool, activity.id, 4, "14:00", 10).await;
    make_subscription(&pool, activity.id, "+15550000043", 8, &["Mira"]).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.enrollments, 1);

    // Re-enrolling the same slot finds the existing record and does
    // nothing.
    let slots = slots_of(&pool, activity.id).await;
    let again = auto_enroll_slot(&pool, activity.id, &slots[0]).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(slots_of(&pool, activity.id).await[0].booked, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_quota_limits_enrollment_across_slots(pool: PgPool) {
    let activity = make_activity(&pool, "Weaving", true).await;
    // Two templates, but the subscription has a single visit left.
    make_template(&pool, activity.id, 1, "17:00", 10).await;
    make_template(&pool, activity.id, 2, "17:00", 10).await;
    let subscription = make_subscription(&pool, activity.id, "+15550000044", 1, &["Mira"]).await;

    let summary = extend_schedule(&pool, 1).await.unwrap();
    assert_eq!(summary.slots_created, 2);
    assert_eq!(summary.enrollments, 1);

    let refreshed = SubscriptionRepo::find_by_id(&pool, subscription.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.visits_used, 1);
    assert_eq!(refreshed.visits_total, 1);
}
