//! Template-driven schedule generation.

use atelier_core::schedule::{
    clamp_weeks, slot_bounds, weekday_number, GenerationWindow, TemplateTime,
};
use atelier_db::models::slot::NewGeneratedSlot;
use atelier_db::repositories::{ActivityRepo, SlotRepo, TemplateRepo};
use atelier_db::DbPool;
use chrono::Utc;

use crate::enroll::auto_enroll_slot;

/// What one generation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GenerationSummary {
    pub slots_created: u32,
    pub slots_skipped: u32,
    pub enrollments: u32,
}

/// Materialize slots for every regular activity's templates over the
/// next `weeks` weeks (clamped to 1-4), starting tomorrow, weekdays
/// only. Each newly created slot is immediately auto-enrolled.
///
/// Safe to call repeatedly and concurrently: a slot whose
/// (activity, start) minute is already taken is skipped, and the
/// storage uniqueness constraint catches the race between the check
/// and the insert. Per-slot failures are logged and the walk continues.
pub async fn extend_schedule(pool: &DbPool, weeks: i64) -> Result<GenerationSummary, sqlx::Error> {
    let weeks = clamp_weeks(weeks);
    let window = GenerationWindow::starting_tomorrow(Utc::now(), weeks);
    tracing::info!(weeks, start = %window.start, end = %window.end, "extending schedule");

    let mut summary = GenerationSummary::default();
    let activities = ActivityRepo::list_regular(pool).await?;
    for activity in &activities {
        let templates = TemplateRepo::list_by_activity(pool, activity.id).await?;
        for template in &templates {
            let time = match TemplateTime::parse(&template.start_time) {
                Ok(t) => t,
                Err(err) => {
                    tracing::warn!(
                        template_id = template.id,
                        start_time = %template.start_time,
                        error = %err,
                        "template has an unusable start time, skipping"
                    );
                    continue;
                }
            };

            for date in window.weekdays() {
                if weekday_number(date) as i16 != template.day_of_week {
                    continue;
                }
                let (start_time, end_time) = slot_bounds(date, time, activity.duration_minutes);
                let new_slot = NewGeneratedSlot {
                    activity_id: activity.id,
                    start_time,
                    end_time,
                    capacity: template.capacity,
                    template_id: template.id,
                };
                match SlotRepo::insert_generated(pool, &new_slot).await {
                    Ok(Some(slot)) => {
                        summary.slots_created += 1;
                        match auto_enroll_slot(pool, activity.id, &slot).await {
                            Ok(n) => summary.enrollments += n,
                            Err(err) => {
                                tracing::warn!(
                                    slot_id = slot.id,
                                    error = %err,
                                    "auto-enrollment failed for generated slot"
                                );
                            }
                        }
                    }
                    Ok(None) => summary.slots_skipped += 1,
                    Err(err) => {
                        tracing::warn!(
                            activity_id = activity.id,
                            template_id = template.id,
                            start_time = %start_time,
                            error = %err,
                            "failed to create generated slot, continuing"
                        );
                    }
                }
            }
        }
    }

    tracing::info!(
        created = summary.slots_created,
        skipped = summary.slots_skipped,
        enrollments = summary.enrollments,
        "schedule extension finished"
    );
    Ok(summary)
}
