//! Handlers for schedule templates.
//!
//! Templates are nested under activities for creation and listing:
//! `/activities/{activity_id}/templates`, with a flat
//! `/templates[/{id}]` surface for operator tooling.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::template::{CreateTemplate, ScheduleTemplate, UpdateTemplate};
use atelier_db::repositories::{ActivityRepo, TemplateRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

async fn invalidate_templates(state: &AppState) {
    state
        .cache
        .invalidate(&[
            atelier_cache::keys::templates(),
            atelier_cache::keys::schedule(),
        ])
        .await;
}

/// POST /api/v1/activities/{activity_id}/templates
pub async fn create(
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<(StatusCode, Json<ScheduleTemplate>)> {
    let activity = ActivityRepo::find_by_id(&state.pool, activity_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id: activity_id,
        }))?;
    if !activity.is_regular {
        return Err(AppError::Core(CoreError::Validation(
            "only regular activities can have templates".to_string(),
        )));
    }
    let template = TemplateRepo::create(&state.pool, activity_id, &input).await?;
    invalidate_templates(&state).await;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/v1/activities/{activity_id}/templates
pub async fn list_by_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<Json<Vec<ScheduleTemplate>>> {
    let templates = TemplateRepo::list_by_activity(&state.pool, activity_id).await?;
    Ok(Json(templates))
}

/// GET /api/v1/templates
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ScheduleTemplate>>> {
    let templates = TemplateRepo::list(&state.pool).await?;
    Ok(Json(templates))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ScheduleTemplate>> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;
    Ok(Json(template))
}

/// PUT /api/v1/templates/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<Json<ScheduleTemplate>> {
    let template = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;
    invalidate_templates(&state).await;
    Ok(Json(template))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = TemplateRepo::delete(&state.pool, id).await?;
    if deleted {
        invalidate_templates(&state).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))
    }
}
