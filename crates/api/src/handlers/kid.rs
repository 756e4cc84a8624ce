//! Handlers for client-managed child profiles under `/client/kids`.
//!
//! Every operation is scoped to the user resolved from the verified
//! phone number, so a client can never touch another family's kids.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::kid::{CreateUserKid, UpdateUserKid, UserKid};
use atelier_db::models::user::User;
use atelier_db::repositories::{KidRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::client::ClientPhone;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

async fn resolve_user(state: &AppState, phone: &str) -> AppResult<User> {
    UserRepo::find_by_phone(&state.pool, phone)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "no user registered for phone {phone}"
            )))
        })
}

/// POST /api/v1/client/kids
pub async fn create(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Json(input): Json<CreateUserKid>,
) -> AppResult<(StatusCode, Json<UserKid>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be blank".to_string()));
    }
    if input.age < 0 {
        return Err(AppError::BadRequest("age must not be negative".to_string()));
    }
    let user = resolve_user(&state, &phone).await?;
    let kid = KidRepo::create(&state.pool, user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(kid)))
}

/// GET /api/v1/client/kids
pub async fn list(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
) -> AppResult<Json<Vec<UserKid>>> {
    let user = resolve_user(&state, &phone).await?;
    let kids = KidRepo::list_by_user(&state.pool, user.id).await?;
    Ok(Json(kids))
}

/// PUT /api/v1/client/kids/{id}
pub async fn update(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserKid>,
) -> AppResult<Json<UserKid>> {
    let user = resolve_user(&state, &phone).await?;
    let kid = KidRepo::update(&state.pool, user.id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Kid", id }))?;
    Ok(Json(kid))
}

/// DELETE /api/v1/client/kids/{id}
pub async fn delete(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = resolve_user(&state, &phone).await?;
    let deleted = KidRepo::delete(&state.pool, user.id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Kid", id }))
    }
}
