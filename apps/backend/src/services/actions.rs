//! Action log recording.

use chrono::{DateTime, Utc};
use word_progress_core::ActionLogEntry;

use crate::error::{ApiError, Result};
use crate::models::RecordActionRequest;
use crate::store::RowStore;

pub async fn record_action<S: RowStore>(
    store: &S,
    request: RecordActionRequest,
    now: DateTime<Utc>,
) -> Result<ActionLogEntry> {
    if !store.word_exists(&request.word_id).await? {
        return Err(ApiError::NotFound(format!("word {}", request.word_id)));
    }

    let entry = ActionLogEntry {
        user_id: request.user_id,
        word_id: request.word_id,
        action_type: request.action_type,
        success: request.success,
        metadata: request.metadata,
        created_at: now,
    };
    store.append_action(&entry).await?;

    tracing::debug!(
        user_id = %entry.user_id,
        word_id = %entry.word_id,
        action = entry.action_type.as_str(),
        "action recorded"
    );
    Ok(entry)
}
