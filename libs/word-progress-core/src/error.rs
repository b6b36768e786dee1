//! Error types for word-progress-core.

use thiserror::Error;

use crate::assessment::Stage;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the assessment, strategy and scheduling kernels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid transition: {event} is not accepted at stage {stage}")]
    InvalidTransition { stage: Stage, event: String },

    #[error("assessment ended at stage {stage} before reaching a level")]
    IncompleteAssessment { stage: Stage },

    #[error("invalid proficiency level: {0}")]
    InvalidLevel(i64),

    #[error("no review strategy applies to {context}")]
    NoApplicableStrategy { context: String },

    #[error("review strategies {ids:?} all apply to {context}")]
    AmbiguousStrategy { ids: Vec<String>, context: String },

    #[error("invalid review strategy {id}: {reason}")]
    InvalidStrategy { id: String, reason: String },

    #[error("unknown adaptive algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid review config: {0}")]
    InvalidReviewConfig(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}
