//! Scheduling engine.
//!
//! Stateless: every decision is derived from the progress row it is handed,
//! so recomputing after a reload is always safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::algorithm::{add_days, AlgorithmRegistry};
use crate::error::{CoreError, Result};
use crate::types::{
    ProficiencyLevel, ReviewScheduleLog, ReviewStrategy, StrategyType, UserWordProgress,
};

/// Result of one scheduling decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub progress: UserWordProgress,
    pub log: ReviewScheduleLog,
}

/// Ladder rung for the given review count, clamped to the last rung.
pub fn ladder_interval(ladder: &[f64], reviewed_times: u32) -> Option<(usize, f64)> {
    let index = (reviewed_times as usize).min(ladder.len().checked_sub(1)?);
    Some((index, ladder[index]))
}

/// Compute the updated progress row and its schedule-log entry.
///
/// Adaptive strategies look their algorithm up in `algorithms`.
pub fn schedule_next_review(
    progress: &UserWordProgress,
    level: ProficiencyLevel,
    strategy: &ReviewStrategy,
    algorithms: &AlgorithmRegistry,
    now: DateTime<Utc>,
) -> Result<ScheduleOutcome> {
    strategy.validate()?;

    let reviewed_times = progress.reviewed_times.unwrap_or(0);
    let mut updated = progress.clone();

    let (next_review_date, review_config, review_log) = match strategy.strategy_type {
        StrategyType::Traditional => {
            let (index, days) = ladder_interval(&strategy.interval_rule, reviewed_times)
                .ok_or_else(|| CoreError::InvalidStrategy {
                    id: strategy.id.clone(),
                    reason: "interval ladder is empty".to_string(),
                })?;
            let log = json!({ "ladder_index": index, "level": level.value() });
            (add_days(now, days)?, None, Some(log))
        }
        StrategyType::Adaptive => {
            let name = strategy.algorithm.as_deref().unwrap_or_default();
            let algorithm = algorithms
                .get(name)
                .ok_or_else(|| CoreError::UnknownAlgorithm(name.to_string()))?;
            let outcome = algorithm.schedule(&progress.review_config, level, now)?;
            updated.review_config = outcome.review_config.clone();
            (outcome.next_review_date, Some(outcome.review_config), outcome.review_log)
        }
    };

    if next_review_date < now {
        return Err(CoreError::InvalidSchedule(format!(
            "next review {next_review_date} precedes review time {now}"
        )));
    }

    if updated.start_date.is_none() {
        updated.start_date = Some(now);
    }
    updated.last_review_date = Some(now);
    updated.next_review_date = Some(next_review_date);
    updated.reviewed_times = Some(reviewed_times + 1);
    updated.proficiency_level = level;
    updated.strategy_id = Some(strategy.id.clone());

    let schedule_days = (next_review_date - now).num_milliseconds() as f64 / 86_400_000.0;

    let log = ReviewScheduleLog {
        user_id: progress.user_id.clone(),
        word_id: progress.word_id.clone(),
        review_time: now,
        schedule_days,
        next_review_time: next_review_date,
        strategy_id: strategy.id.clone(),
        review_config,
        review_log,
    };

    Ok(ScheduleOutcome { progress: updated, log })
}
