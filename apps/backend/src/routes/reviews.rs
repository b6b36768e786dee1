//! Review scheduling endpoints

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::services::review::schedule_review;
use crate::store::RowStore;
use crate::AppState;

/// POST /api/reviews/schedule
pub async fn schedule<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<ScheduleReviewRequest>,
) -> Result<Json<ScheduleOutcome>> {
    let outcome = schedule_review(
        state.store.as_ref(),
        state.algorithms.as_ref(),
        &payload,
        Utc::now(),
    )
    .await?;
    Ok(Json(outcome))
}
