//! Assessment endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use word_progress_core::AnswerOutcome;

use crate::error::Result;
use crate::models::*;
use crate::services::history::load_history;
use crate::services::review::schedule_review;
use crate::services::sessions::AnswerResult;
use crate::store::RowStore;
use crate::AppState;

/// POST /api/assessments
pub async fn start<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<StartAssessmentRequest>,
) -> Result<Json<StartAssessmentResponse>> {
    let history = load_history(state.store.as_ref(), &payload.user_id, &payload.word_id).await?;
    let history_length = history.len();

    let (session_id, stage) = state
        .sessions
        .start(&payload.user_id, &payload.word_id, history, Utc::now())?;

    Ok(Json(StartAssessmentResponse {
        session_id,
        stage,
        history_length,
    }))
}

/// POST /api/assessments/:id/answer
///
/// A resolving answer also schedules the word's next review at that level.
pub async fn answer<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    let now = Utc::now();
    let result = state
        .sessions
        .submit(session_id, AnswerOutcome::from_bool(payload.success), now)?;

    let response = match result {
        AnswerResult::Pending(stage) => SubmitAnswerResponse {
            session_id,
            stage: Some(stage),
            resolved_level: None,
            schedule: None,
        },
        AnswerResult::Resolved {
            user_id,
            word_id,
            level,
        } => {
            let request = ScheduleReviewRequest {
                user_id,
                word_id,
                level,
                is_long_difficult: None,
            };
            let outcome = schedule_review(
                state.store.as_ref(),
                state.algorithms.as_ref(),
                &request,
                now,
            )
            .await?;
            SubmitAnswerResponse {
                session_id,
                stage: None,
                resolved_level: Some(level),
                schedule: Some(outcome),
            }
        }
    };

    Ok(Json(response))
}
