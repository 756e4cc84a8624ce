//! Admin surface over the studio error log.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::studio_error::StudioErrorPage;
use atelier_db::repositories::StudioErrorRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the paginated error listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    100
}

/// GET /api/v1/errors
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<StudioErrorPage>> {
    let page = StudioErrorRepo::list(&state.pool, params.page, params.page_size).await?;
    Ok(Json(page))
}

/// DELETE /api/v1/errors/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = StudioErrorRepo::delete(&state.pool, id).await?;
    if deleted {
        state
            .cache
            .invalidate(&[atelier_cache::keys::studio_errors()])
            .await;
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "StudioError",
            id,
        }))
    }
}
