//! Handlers for the `/subscription-types` resource.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::subscription_type::{
    CreateSubscriptionType, SubscriptionType, UpdateSubscriptionType,
};
use atelier_db::repositories::{ActivityRepo, SubscriptionTypeRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/subscription-types
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSubscriptionType>,
) -> AppResult<(StatusCode, Json<SubscriptionType>)> {
    ActivityRepo::find_by_id(&state.pool, input.activity_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id: input.activity_id,
        }))?;
    if input.visits_count < 1 {
        return Err(AppError::BadRequest(
            "visits_count must be at least 1".to_string(),
        ));
    }
    let sub_type = SubscriptionTypeRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(sub_type)))
}

/// GET /api/v1/subscription-types
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<SubscriptionType>>> {
    let types = SubscriptionTypeRepo::list(&state.pool).await?;
    Ok(Json(types))
}

/// GET /api/v1/activities/{activity_id}/subscription-types
pub async fn list_by_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<Json<Vec<SubscriptionType>>> {
    let types = SubscriptionTypeRepo::list_by_activity(&state.pool, activity_id).await?;
    Ok(Json(types))
}

/// GET /api/v1/subscription-types/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubscriptionType>> {
    let sub_type = SubscriptionTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionType",
            id,
        }))?;
    Ok(Json(sub_type))
}

/// PUT /api/v1/subscription-types/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubscriptionType>,
) -> AppResult<Json<SubscriptionType>> {
    let sub_type = SubscriptionTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionType",
            id,
        }))?;
    Ok(Json(sub_type))
}

/// DELETE /api/v1/subscription-types/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = SubscriptionTypeRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionType",
            id,
        }))
    }
}
