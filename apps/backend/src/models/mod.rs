//! Database rows and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from word-progress-core
pub use word_progress_core::types::{
    ActionLogEntry, ActionType, ProficiencyLevel, ReviewScheduleLog, ReviewStrategy,
    StrategyCondition, StrategyType, UserWordProgress,
};
pub use word_progress_core::{ScheduleOutcome, Stage};

use crate::error::{ApiError, Result};

// === Database Row Types ===

/// Progress row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbUserWordProgress {
    pub user_id: String,
    pub word_id: String,
    pub is_long_difficult: bool,
    pub proficiency_level: i16,
    pub strategy_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub last_review_date: Option<DateTime<Utc>>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub reviewed_times: Option<i32>,
    pub review_config: Value,
}

impl DbUserWordProgress {
    /// Create from word-progress-core progress
    pub fn from_core(progress: &UserWordProgress) -> Self {
        Self {
            user_id: progress.user_id.clone(),
            word_id: progress.word_id.clone(),
            is_long_difficult: progress.is_long_difficult,
            proficiency_level: progress.proficiency_level.value() as i16,
            strategy_id: progress.strategy_id.clone(),
            start_date: progress.start_date,
            last_review_date: progress.last_review_date,
            next_review_date: progress.next_review_date,
            reviewed_times: progress.reviewed_times.map(|n| n as i32),
            review_config: progress.review_config.clone(),
        }
    }

    /// Convert to word-progress-core progress
    pub fn to_core(&self) -> Result<UserWordProgress> {
        Ok(UserWordProgress {
            user_id: self.user_id.clone(),
            word_id: self.word_id.clone(),
            is_long_difficult: self.is_long_difficult,
            proficiency_level: ProficiencyLevel::try_from(self.proficiency_level as i64)?,
            strategy_id: self.strategy_id.clone(),
            start_date: self.start_date,
            last_review_date: self.last_review_date,
            next_review_date: self.next_review_date,
            reviewed_times: self.reviewed_times.map(|n| n.max(0) as u32),
            review_config: self.review_config.clone(),
        })
    }
}

/// Review strategy row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbReviewStrategy {
    pub id: String,
    pub strategy_type: String,
    pub strategy_name: String,
    pub applicable_condition: Json<StrategyCondition>,
    pub interval_rule: Json<Vec<f64>>,
    pub algorithm: Option<String>,
}

impl DbReviewStrategy {
    pub fn to_core(self) -> Result<ReviewStrategy> {
        let strategy_type = StrategyType::from_str(&self.strategy_type).ok_or_else(|| {
            ApiError::Internal(format!(
                "strategy {} has unknown type {}",
                self.id, self.strategy_type
            ))
        })?;

        Ok(ReviewStrategy {
            id: self.id,
            strategy_type,
            strategy_name: self.strategy_name,
            applicable_condition: self.applicable_condition.0,
            interval_rule: self.interval_rule.0,
            algorithm: self.algorithm,
        })
    }
}

/// Schedule log row in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbReviewScheduleLog {
    pub id: i64,
    pub user_id: String,
    pub word_id: String,
    pub review_time: DateTime<Utc>,
    pub schedule_days: f64,
    pub next_review_time: DateTime<Utc>,
    pub strategy_id: String,
    pub review_config: Option<Value>,
    pub review_log: Option<Value>,
}

impl DbReviewScheduleLog {
    pub fn to_core(self) -> ReviewScheduleLog {
        ReviewScheduleLog {
            user_id: self.user_id,
            word_id: self.word_id,
            review_time: self.review_time,
            schedule_days: self.schedule_days,
            next_review_time: self.next_review_time,
            strategy_id: self.strategy_id,
            review_config: self.review_config,
            review_log: self.review_log,
        }
    }
}

// === API Request/Response Types ===

/// POST /api/assessments request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAssessmentRequest {
    pub user_id: String,
    pub word_id: String,
}

/// POST /api/assessments response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAssessmentResponse {
    pub session_id: Uuid,
    pub stage: Stage,
    pub history_length: usize,
}

/// POST /api/assessments/:id/answer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub success: bool,
}

/// POST /api/assessments/:id/answer response. Exactly one of `stage` and
/// `resolved_level` is set; a resolved level carries the review it scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_level: Option<ProficiencyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleOutcome>,
}

/// POST /api/reviews/schedule request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReviewRequest {
    pub user_id: String,
    pub word_id: String,
    pub level: ProficiencyLevel,
    /// Overrides the stored long-difficult flag when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_long_difficult: Option<bool>,
}

/// GET /api/history/:user_id/:word_id response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub word_id: String,
    pub levels: Vec<ProficiencyLevel>,
}

/// GET /api/users/:user_id/due query
#[derive(Debug, Clone, Deserialize)]
pub struct DueQuery {
    pub limit: Option<i64>,
}

/// POST /api/actions request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordActionRequest {
    pub user_id: String,
    pub word_id: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub metadata: Value,
}

/// PUT /api/words/:word_id request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterWordRequest {
    #[serde(default)]
    pub spelling: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_progress_row_round_trip() {
        let mut progress = UserWordProgress::new("u1", "w1", true);
        progress.proficiency_level = ProficiencyLevel::L3;
        progress.reviewed_times = Some(4);
        progress.last_review_date = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        progress.review_config = json!({"stability": 2.5});

        let row = DbUserWordProgress::from_core(&progress);
        assert_eq!(row.proficiency_level, 3);
        assert_eq!(row.to_core().unwrap(), progress);
    }

    #[test]
    fn test_progress_row_rejects_bad_level() {
        let mut row = DbUserWordProgress::from_core(&UserWordProgress::new("u1", "w1", false));
        row.proficiency_level = 9;
        assert!(row.to_core().is_err());
    }

    #[test]
    fn test_strategy_row_rejects_unknown_type() {
        let row = DbReviewStrategy {
            id: "s1".to_string(),
            strategy_type: "RANDOM".to_string(),
            strategy_name: "random".to_string(),
            applicable_condition: Json(StrategyCondition::default()),
            interval_rule: Json(vec![]),
            algorithm: None,
        };
        assert!(row.to_core().is_err());
    }

    #[test]
    fn test_submit_answer_response_omits_unset_field() {
        let response = SubmitAnswerResponse {
            session_id: Uuid::nil(),
            stage: None,
            resolved_level: Some(ProficiencyLevel::L2),
            schedule: None,
        };
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["resolved_level"], 2);
        assert!(body.get("stage").is_none());
    }
}
