//! Handlers for the `/users` resource.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::UserRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::client::ClientPhone;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be blank".to_string()));
    }
    if input.phone_number.trim().is_empty() {
        return Err(AppError::BadRequest(
            "phone_number must not be blank".to_string(),
        ));
    }
    let user = UserRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<User>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user))
}

/// GET /api/v1/client/me
///
/// The profile of the requesting client.
pub async fn me(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
) -> AppResult<Json<User>> {
    let user = UserRepo::find_by_phone(&state.pool, &phone)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "no user registered for phone {phone}"
            )))
        })?;
    Ok(Json(user))
}
