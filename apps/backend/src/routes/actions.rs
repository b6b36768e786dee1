//! Action log endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::services::actions::record_action;
use crate::store::RowStore;
use crate::AppState;

/// POST /api/actions
pub async fn record<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<RecordActionRequest>,
) -> Result<(StatusCode, Json<ActionLogEntry>)> {
    let entry = record_action(state.store.as_ref(), payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
