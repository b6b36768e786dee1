//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use word_progress_core::CoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),

    #[error("Log sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::PersistenceConflict(_) => (StatusCode::CONFLICT, "persistence_conflict"),
            ApiError::SinkUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "sink_unavailable"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Core(core) => match core {
                CoreError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
                CoreError::IncompleteAssessment { .. } => {
                    (StatusCode::CONFLICT, "incomplete_assessment")
                }
                CoreError::InvalidLevel(_) => (StatusCode::BAD_REQUEST, "invalid_level"),
                CoreError::NoApplicableStrategy { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "no_applicable_strategy")
                }
                CoreError::AmbiguousStrategy { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "ambiguous_strategy")
                }
                CoreError::InvalidStrategy { .. } | CoreError::UnknownAlgorithm(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "invalid_strategy")
                }
                CoreError::InvalidReviewConfig(_) | CoreError::InvalidSchedule(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "scheduling_error")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_kind();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use word_progress_core::{ProficiencyLevel, Stage};

    #[test]
    fn test_not_found_status() {
        let error = ApiError::NotFound("word w1".to_string());
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_transition_status() {
        let error = ApiError::Core(CoreError::InvalidTransition {
            stage: Stage::Terminal(ProficiencyLevel::L2),
            event: "answer(success)".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_strategy_defect_status() {
        let error = ApiError::Core(CoreError::AmbiguousStrategy {
            ids: vec!["a".to_string(), "b".to_string()],
            context: "level L1".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_conflict_status() {
        let error = ApiError::PersistenceConflict("u1/w1".to_string());
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_sink_unavailable_status() {
        let error = ApiError::SinkUnavailable("log insert failed".to_string());
        assert_eq!(error.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_display_core() {
        let error = ApiError::Core(CoreError::UnknownAlgorithm("leitner".to_string()));
        assert_eq!(error.to_string(), "unknown adaptive algorithm: leitner");
    }

    #[test]
    fn test_error_display_not_found() {
        let error = ApiError::NotFound("Word w1".to_string());
        assert_eq!(error.to_string(), "Not found: Word w1");
    }
}
