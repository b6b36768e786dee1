//! Progress and history endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::history::load_history;
use crate::store::RowStore;
use crate::AppState;

const DEFAULT_DUE_LIMIT: i64 = 200;

/// GET /api/progress/:user_id/:word_id
pub async fn get<S: RowStore>(
    State(state): State<AppState<S>>,
    Path((user_id, word_id)): Path<(String, String)>,
) -> Result<Json<UserWordProgress>> {
    let progress = state
        .store
        .get_progress(&user_id, &word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("progress for {user_id}/{word_id}")))?;

    Ok(Json(progress))
}

/// GET /api/history/:user_id/:word_id
pub async fn history<S: RowStore>(
    State(state): State<AppState<S>>,
    Path((user_id, word_id)): Path<(String, String)>,
) -> Result<Json<HistoryResponse>> {
    let levels = load_history(state.store.as_ref(), &user_id, &word_id).await?;
    Ok(Json(HistoryResponse {
        user_id,
        word_id,
        levels,
    }))
}

/// GET /api/users/:user_id/due
pub async fn due<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<UserWordProgress>>> {
    let limit = query.limit.unwrap_or(DEFAULT_DUE_LIMIT);
    if limit <= 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }

    let due = state
        .store
        .list_due_progress(&user_id, Utc::now(), limit)
        .await?;
    Ok(Json(due))
}

/// GET /api/schedule-logs/:user_id/:word_id
pub async fn schedule_logs<S: RowStore>(
    State(state): State<AppState<S>>,
    Path((user_id, word_id)): Path<(String, String)>,
) -> Result<Json<Vec<ReviewScheduleLog>>> {
    if !state.store.word_exists(&word_id).await? {
        return Err(ApiError::NotFound(format!("word {word_id}")));
    }
    let logs = state.store.schedule_logs(&user_id, &word_id).await?;
    Ok(Json(logs))
}
