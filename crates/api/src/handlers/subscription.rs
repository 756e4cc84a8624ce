//! Handlers for the `/subscriptions` resource.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::subscription::{CreateSubscription, SubscriptionWithKids};
use atelier_db::repositories::{SubscriptionRepo, SubscriptionTypeRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

async fn invalidate_subscriptions(state: &AppState) {
    state
        .cache
        .invalidate(&[atelier_cache::keys::subscriptions_all()])
        .await;
}

/// POST /api/v1/subscriptions
///
/// Purchases a subscription. The visit quota and validity window come
/// from the referenced subscription type.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<SubscriptionWithKids>)> {
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;
    let sub_type = SubscriptionTypeRepo::find_by_id(&state.pool, input.subscription_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SubscriptionType",
            id: input.subscription_type_id,
        }))?;
    if !sub_type.is_active {
        return Err(AppError::BadRequest(format!(
            "subscription type {} is no longer sold",
            sub_type.id
        )));
    }

    let subscription = SubscriptionRepo::create_with_kids(&state.pool, &sub_type, &input).await?;
    invalidate_subscriptions(&state).await;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// GET /api/v1/subscriptions
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<SubscriptionWithKids>>> {
    let subscriptions = SubscriptionRepo::list(&state.pool).await?;
    Ok(Json(subscriptions))
}

/// GET /api/v1/subscriptions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubscriptionWithKids>> {
    let subscription = SubscriptionRepo::find_with_kids(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id,
        }))?;
    Ok(Json(subscription))
}

/// DELETE /api/v1/subscriptions/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = SubscriptionRepo::delete(&state.pool, id).await?;
    if deleted {
        invalidate_subscriptions(&state).await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id,
        }))
    }
}
