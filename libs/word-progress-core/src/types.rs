//! Core types shared by the assessment and scheduling kernels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CoreError;

/// Discrete mastery tier for a (user, word) pair. Higher is more mastered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(u8)]
pub enum ProficiencyLevel {
    L0 = 0,
    L1 = 1,
    L2 = 2,
    L3 = 3,
    L4 = 4,
}

impl ProficiencyLevel {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for ProficiencyLevel {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::L0),
            1 => Ok(Self::L1),
            2 => Ok(Self::L2),
            3 => Ok(Self::L3),
            4 => Ok(Self::L4),
            other => Err(CoreError::InvalidLevel(other)),
        }
    }
}

impl From<ProficiencyLevel> for i64 {
    fn from(level: ProficiencyLevel) -> Self {
        level.value() as i64
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.value())
    }
}

/// Binary result of a single answer during an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Success,
    Fail,
}

impl AnswerOutcome {
    pub fn from_bool(success: bool) -> Self {
        if success { Self::Success } else { Self::Fail }
    }
}

/// Recall grade fed to the adaptive algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Map an assessed level to a recall grade.
    /// L0 -> Again, L1 -> Hard, L2 -> Good, L3 and above -> Easy
    pub fn from_level(level: ProficiencyLevel) -> Self {
        match level {
            ProficiencyLevel::L0 => Self::Again,
            ProficiencyLevel::L1 => Self::Hard,
            ProficiencyLevel::L2 => Self::Good,
            ProficiencyLevel::L3 | ProficiencyLevel::L4 => Self::Easy,
        }
    }
}

/// Kind of review strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    /// Fixed-interval ladder.
    Traditional,
    /// Spaced-repetition algorithm with per-word memory state.
    Adaptive,
}

impl StrategyType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "TRADITIONAL" => Some(Self::Traditional),
            "ADAPTIVE" => Some(Self::Adaptive),
            _ => None,
        }
    }
}

/// Exact predicate over the scheduling context. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyCondition {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<ProficiencyLevel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_long_difficult: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_history_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history_length: Option<u32>,
}

/// Persistent review strategy definition. Never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStrategy {
    pub id: String,
    pub strategy_type: StrategyType,
    pub strategy_name: String,
    pub applicable_condition: StrategyCondition,
    /// Interval ladder in days, used by traditional strategies.
    #[serde(default)]
    pub interval_rule: Vec<f64>,
    /// Adaptive algorithm name, used by adaptive strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// Learning progress of one user on one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWordProgress {
    pub user_id: String,
    pub word_id: String,
    pub is_long_difficult: bool,
    pub proficiency_level: ProficiencyLevel,
    pub strategy_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub last_review_date: Option<DateTime<Utc>>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub reviewed_times: Option<u32>,
    #[serde(default)]
    pub review_config: Value,
}

impl UserWordProgress {
    /// Fresh progress row for a word that has never been scheduled.
    pub fn new(
        user_id: impl Into<String>,
        word_id: impl Into<String>,
        is_long_difficult: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            word_id: word_id.into(),
            is_long_difficult,
            proficiency_level: ProficiencyLevel::L0,
            strategy_id: None,
            start_date: None,
            last_review_date: None,
            next_review_date: None,
            reviewed_times: None,
            review_config: Value::Null,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date.is_some_and(|next| next <= now)
    }
}

/// Append-only audit record of one scheduling decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewScheduleLog {
    pub user_id: String,
    pub word_id: String,
    pub review_time: DateTime<Utc>,
    pub schedule_days: f64,
    pub next_review_time: DateTime<Utc>,
    pub strategy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_log: Option<Value>,
}

/// Kind of user interaction recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Listen,
    TransEn,
    TransCh,
    Spelling,
    Pronounce,
    Learn,
    Skip,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listen => "LISTEN",
            Self::TransEn => "TRANS_EN",
            Self::TransCh => "TRANS_CH",
            Self::Spelling => "SPELLING",
            Self::Pronounce => "PRONOUNCE",
            Self::Learn => "LEARN",
            Self::Skip => "SKIP",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LISTEN" => Some(Self::Listen),
            "TRANS_EN" => Some(Self::TransEn),
            "TRANS_CH" => Some(Self::TransCh),
            "SPELLING" => Some(Self::Spelling),
            "PRONOUNCE" => Some(Self::Pronounce),
            "LEARN" => Some(Self::Learn),
            "SKIP" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// One user interaction with a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub user_id: String,
    pub word_id: String,
    pub action_type: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_numerically() {
        assert!(ProficiencyLevel::L0 < ProficiencyLevel::L1);
        assert!(ProficiencyLevel::L3 < ProficiencyLevel::L4);
        assert_eq!(ProficiencyLevel::L2.value(), 2);
    }

    #[test]
    fn level_rejects_out_of_range() {
        assert_eq!(ProficiencyLevel::try_from(5_i64), Err(CoreError::InvalidLevel(5)));
        assert_eq!(ProficiencyLevel::try_from(-1_i64), Err(CoreError::InvalidLevel(-1)));
    }

    #[test]
    fn level_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ProficiencyLevel::L3).unwrap(), "3");
        let level: ProficiencyLevel = serde_json::from_str("1").unwrap();
        assert_eq!(level, ProficiencyLevel::L1);
        assert!(serde_json::from_str::<ProficiencyLevel>("7").is_err());
    }

    #[test]
    fn action_type_uses_log_names() {
        assert_eq!(serde_json::to_string(&ActionType::TransEn).unwrap(), "\"TRANS_EN\"");
        assert_eq!(ActionType::from_str("SPELLING"), Some(ActionType::Spelling));
        assert_eq!(ActionType::from_str("spelling"), None);
    }

    #[test]
    fn rating_from_level() {
        assert_eq!(Rating::from_level(ProficiencyLevel::L0), Rating::Again);
        assert_eq!(Rating::from_level(ProficiencyLevel::L2), Rating::Good);
        assert_eq!(Rating::from_level(ProficiencyLevel::L4), Rating::Easy);
    }

    #[test]
    fn new_progress_is_not_due() {
        let progress = UserWordProgress::new("u1", "w1", false);
        assert!(!progress.is_due(Utc::now()));
        assert_eq!(progress.review_config, Value::Null);
    }
}
