//! Review scheduling: resolve the strategy, compute the decision, commit it.

use chrono::{DateTime, Utc};
use word_progress_core::{
    resolve, schedule_next_review, AlgorithmRegistry, ScheduleOutcome, StrategyContext,
    UserWordProgress,
};

use crate::error::{ApiError, Result};
use crate::models::ScheduleReviewRequest;
use crate::services::history::load_history;
use crate::store::RowStore;

/// Schedule the next review for a freshly assessed word.
///
/// A concurrent write to the same progress row is retried once from a fresh
/// reload; a second conflict is returned to the caller.
pub async fn schedule_review<S: RowStore>(
    store: &S,
    algorithms: &AlgorithmRegistry,
    request: &ScheduleReviewRequest,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome> {
    let mut retried = false;
    loop {
        match attempt(store, algorithms, request, now).await {
            Err(ApiError::PersistenceConflict(reason)) if !retried => {
                tracing::warn!(
                    user_id = %request.user_id,
                    word_id = %request.word_id,
                    %reason,
                    "scheduling conflict, retrying from reloaded progress"
                );
                retried = true;
            }
            Err(ApiError::SinkUnavailable(reason)) => {
                tracing::error!(
                    user_id = %request.user_id,
                    word_id = %request.word_id,
                    %reason,
                    "schedule log unavailable, progress not committed"
                );
                return Err(ApiError::SinkUnavailable(reason));
            }
            other => return other,
        }
    }
}

async fn attempt<S: RowStore>(
    store: &S,
    algorithms: &AlgorithmRegistry,
    request: &ScheduleReviewRequest,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome> {
    // Progress before history: a commit landing between the two reads
    // changes the row, so the version check below rejects the decision.
    let previous = store.get_progress(&request.user_id, &request.word_id).await?;
    let history = load_history(store, &request.user_id, &request.word_id).await?;

    let mut progress = previous
        .clone()
        .unwrap_or_else(|| UserWordProgress::new(&request.user_id, &request.word_id, false));
    if let Some(flag) = request.is_long_difficult {
        progress.is_long_difficult = flag;
    }

    let ctx = StrategyContext {
        level: request.level,
        is_long_difficult: progress.is_long_difficult,
        history_length: history.len(),
    };
    let strategies = store.list_strategies().await?;
    let strategy = resolve(&strategies, &ctx)?;

    let outcome = schedule_next_review(&progress, request.level, strategy, algorithms, now)?;
    store
        .commit_schedule(previous.as_ref(), &outcome, request.level)
        .await?;

    tracing::info!(
        user_id = %request.user_id,
        word_id = %request.word_id,
        level = %request.level,
        strategy = %strategy.id,
        schedule_days = outcome.log.schedule_days,
        "review scheduled"
    );
    Ok(outcome)
}
