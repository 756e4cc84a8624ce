//! Handler for schedule generation.

use atelier_engine::generator::GenerationSummary;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for a schedule extension.
#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    /// How many weeks to materialize, clamped to 1-4 server-side.
    pub weeks: i64,
}

/// POST /api/v1/schedule/extend
///
/// Materializes template slots over the coming weeks and auto-enrolls
/// active subscriptions into each new slot. Idempotent: re-running
/// over the same window creates nothing new.
pub async fn extend(
    State(state): State<AppState>,
    Json(input): Json<ExtendRequest>,
) -> AppResult<Json<GenerationSummary>> {
    let summary = atelier_engine::extend_schedule(&state.pool, input.weeks).await?;

    if summary.slots_created > 0 {
        state
            .cache
            .invalidate(&[
                atelier_cache::keys::schedule(),
                atelier_cache::keys::all_activity_slots(),
                atelier_cache::keys::records_all(),
                atelier_cache::keys::subscriptions_all(),
            ])
            .await;
    }
    Ok(Json(summary))
}
