//! Handlers for booking records.
//!
//! Operators see every record under `/records`; clients book and list
//! their own under `/client/records`, identified by the verified phone
//! number forwarded in the `X-Client-Phone` header.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::record::{BookingRequest, Record, RecordPage};
use atelier_db::repositories::RecordRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::client::ClientPhone;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for paginated record listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Date prefix filter against the snapshotted slot date, e.g.
    /// `2026-08-25` for a day or `2026-08` for a month.
    pub date: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

async fn invalidate_records(state: &AppState, phone: &str, activity_id: DbId) {
    state
        .cache
        .invalidate(&[
            atelier_cache::keys::records_all(),
            atelier_cache::keys::client_records(phone),
            atelier_cache::keys::activity_slots(activity_id),
        ])
        .await;
}

/// GET /api/v1/records
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<RecordPage>> {
    let page = RecordRepo::list(
        &state.pool,
        params.page,
        params.page_size,
        params.date.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/v1/records/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Record>> {
    let record = RecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;
    Ok(Json(record))
}

/// DELETE /api/v1/records/{id}
///
/// Cancels a booking: the record is removed, the slot places are
/// released and a subscription-funded visit is given back.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let record = RecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;
    RecordRepo::cancel(&state.pool, id).await?;
    invalidate_records(&state, &record.phone_number, record.details.activity_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/client/records
///
/// Books one or more children into a slot for the requesting client.
pub async fn book(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Json(input): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let record = RecordRepo::book(&state.pool, &phone, &input).await?;
    invalidate_records(&state, &phone, record.details.activity_id).await;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/client/records
pub async fn list_mine(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Query(params): Query<ListParams>,
) -> AppResult<Json<RecordPage>> {
    let page =
        RecordRepo::list_by_phone(&state.pool, &phone, params.page, params.page_size).await?;
    Ok(Json(page))
}

/// DELETE /api/v1/client/records/{id}
///
/// A client may only cancel their own booking.
pub async fn cancel_mine(
    State(state): State<AppState>,
    ClientPhone(phone): ClientPhone,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let record = RecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;
    if record.phone_number != phone {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }));
    }
    RecordRepo::cancel(&state.pool, id).await?;
    invalidate_records(&state, &phone, record.details.activity_id).await;
    Ok(StatusCode::NO_CONTENT)
}
