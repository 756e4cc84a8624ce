//! Handlers for the `/activities` resource.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::activity::{Activity, CreateActivity, UpdateActivity};
use atelier_db::repositories::ActivityRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/activities
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateActivity>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    let activity = ActivityRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// GET /api/v1/activities
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Activity>>> {
    let activities = ActivityRepo::list(&state.pool).await?;
    Ok(Json(activities))
}

/// GET /api/v1/activities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Activity>> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))?;
    Ok(Json(activity))
}

/// PUT /api/v1/activities/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateActivity>,
) -> AppResult<Json<Activity>> {
    let activity = ActivityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))?;
    state
        .cache
        .invalidate(&[atelier_cache::keys::activity_slots(id)])
        .await;
    Ok(Json(activity))
}

/// DELETE /api/v1/activities/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ActivityRepo::delete(&state.pool, id).await?;
    if deleted {
        state
            .cache
            .invalidate(&[
                atelier_cache::keys::activity_slots(id),
                atelier_cache::keys::templates(),
            ])
            .await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))
    }
}
