//! Word catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::store::RowStore;
use crate::AppState;

/// PUT /api/words/:word_id
pub async fn register<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(word_id): Path<String>,
    Json(payload): Json<RegisterWordRequest>,
) -> Result<StatusCode> {
    state
        .store
        .register_word(&word_id, payload.spelling.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
