//! Learning progress kernel shared by the backend and any other embedder.
//!
//! Provides:
//! - Assessment state machine mapping answers to a proficiency level
//! - Review strategy resolution (traditional ladder vs. adaptive)
//! - Adaptive spaced repetition algorithms (FSRS, SM-2)
//! - Scheduling engine producing progress updates and schedule-log entries

pub mod algorithm;
pub mod assessment;
pub mod error;
pub mod scheduler;
pub mod strategy;
pub mod types;

pub use algorithm::{AdaptiveAlgorithm, AdaptiveOutcome, AlgorithmRegistry};
pub use assessment::{assess, AssessmentEvent, AssessmentSession, Stage, Step};
pub use error::{CoreError, Result};
pub use scheduler::{schedule_next_review, ScheduleOutcome};
pub use strategy::{default_strategies, resolve, StrategyContext};
pub use types::{
    ActionLogEntry, ActionType, AnswerOutcome, ProficiencyLevel, Rating, ReviewScheduleLog,
    ReviewStrategy, StrategyCondition, StrategyType, UserWordProgress,
};
