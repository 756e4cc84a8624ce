//! Handlers for activity slots.
//!
//! Slot creation and the public availability listing are nested under
//! activities: `/activities/{activity_id}/slots`. Operator-side
//! editing and deletion use the flat `/slots/{id}` surface.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::slot::{
    ActivitySlot, CreateManualSlot, SlotCascadeSummary, UpdateSlot,
};
use atelier_db::repositories::{ActivityRepo, SlotRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

async fn invalidate_slots(state: &AppState, activity_id: DbId) {
    state
        .cache
        .invalidate(&[
            atelier_cache::keys::activity_slots(activity_id),
            atelier_cache::keys::schedule(),
            atelier_cache::keys::records_all(),
        ])
        .await;
}

/// POST /api/v1/activities/{activity_id}/slots
pub async fn create(
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
    Json(input): Json<CreateManualSlot>,
) -> AppResult<(StatusCode, Json<ActivitySlot>)> {
    let activity = ActivityRepo::find_by_id(&state.pool, activity_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id: activity_id,
        }))?;
    let slot = SlotRepo::create_manual(&state.pool, &activity, &input).await?;
    invalidate_slots(&state, activity_id).await;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// GET /api/v1/activities/{activity_id}/slots
///
/// Only bookable slots: future start time and places remaining.
pub async fn list_available(
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<Json<Vec<ActivitySlot>>> {
    let slots = SlotRepo::list_available(&state.pool, activity_id).await?;
    Ok(Json(slots))
}

/// GET /api/v1/slots/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActivitySlot>> {
    let slot = SlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;
    Ok(Json(slot))
}

/// PUT /api/v1/slots/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSlot>,
) -> AppResult<Json<ActivitySlot>> {
    if let Some(capacity) = input.capacity {
        if capacity < 1 {
            return Err(AppError::BadRequest("capacity must be at least 1".to_string()));
        }
    }
    let slot = SlotRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;
    invalidate_slots(&state, slot.activity_id).await;
    Ok(Json(slot))
}

/// DELETE /api/v1/slots/{id}
///
/// Cascade-deletes the slot's records and restores one subscription
/// visit per subscription-funded record.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SlotCascadeSummary>> {
    let slot = SlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;
    let summary = SlotRepo::delete_cascade(&state.pool, id).await?;
    invalidate_slots(&state, slot.activity_id).await;
    state
        .cache
        .invalidate(&[atelier_cache::keys::subscriptions_all()])
        .await;
    Ok(Json(summary))
}
