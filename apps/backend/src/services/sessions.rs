//! In-flight assessment sessions.
//!
//! Sessions live only in memory. A restart, a rejected event or a resolved
//! level ends them; callers start over from `determinePath`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use word_progress_core::{
    AnswerOutcome, AssessmentEvent, AssessmentSession, ProficiencyLevel, Stage, Step,
};

use crate::error::{ApiError, Result};

/// Idle time after which an unfinished session is dropped.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// A session bound to the pair it assesses.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub user_id: String,
    pub word_id: String,
    /// Time of the last accepted event.
    pub last_seen: DateTime<Utc>,
    pub session: AssessmentSession,
}

impl ActiveSession {
    fn expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.last_seen)
            .to_std()
            .map_or(false, |idle| idle >= ttl)
    }
}

/// Outcome of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerResult {
    Pending(Stage),
    Resolved {
        user_id: String,
        word_id: String,
        level: ProficiencyLevel,
    },
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, ActiveSession>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a session over `history` and route it with START.
    pub fn start(
        &self,
        user_id: &str,
        word_id: &str,
        history: Vec<ProficiencyLevel>,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, Stage)> {
        let mut session = AssessmentSession::new(history);
        let stage = match session.send(AssessmentEvent::Start)? {
            Step::Stage(stage) => stage,
            Step::Resolved(level) => Stage::Terminal(level),
        };

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().expect("session lock");
        self.sweep(&mut sessions, now);
        sessions.insert(
            id,
            ActiveSession {
                user_id: user_id.to_string(),
                word_id: word_id.to_string(),
                last_seen: now,
                session,
            },
        );

        tracing::debug!(%id, user_id, word_id, %stage, "assessment started");
        Ok((id, stage))
    }

    /// Feed one answer. The session is dropped once it resolves or rejects.
    pub fn submit(
        &self,
        id: Uuid,
        outcome: AnswerOutcome,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult> {
        let mut sessions = self.sessions.lock().expect("session lock");
        self.sweep(&mut sessions, now);
        let active = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("assessment session {id}")))?;

        match active.session.submit_answer(outcome) {
            Ok(Step::Stage(stage)) => {
                active.last_seen = now;
                Ok(AnswerResult::Pending(stage))
            }
            Ok(Step::Resolved(level)) => {
                let done = sessions.remove(&id).ok_or_else(|| {
                    ApiError::Internal(format!("assessment session {id} vanished"))
                })?;
                tracing::info!(
                    %id,
                    user_id = %done.user_id,
                    word_id = %done.word_id,
                    %level,
                    "assessment resolved"
                );
                Ok(AnswerResult::Resolved {
                    user_id: done.user_id,
                    word_id: done.word_id,
                    level,
                })
            }
            Err(e) => {
                sessions.remove(&id);
                tracing::warn!(%id, error = %e, "assessment session discarded");
                Err(e.into())
            }
        }
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, ActiveSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, active| !active.expired(now, self.ttl));
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "expired assessment sessions dropped");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn later(minutes: i64) -> DateTime<Utc> {
        now() + chrono::Duration::minutes(minutes)
    }

    #[test]
    fn test_flow1_to_l2() {
        let registry = SessionRegistry::new();
        let (id, stage) = registry.start("u1", "w1", vec![], now()).unwrap();
        assert_eq!(stage, Stage::Flow1TransEn);

        assert_eq!(
            registry.submit(id, AnswerOutcome::Success, now()).unwrap(),
            AnswerResult::Pending(Stage::Flow1Pronounce)
        );
        assert_eq!(
            registry.submit(id, AnswerOutcome::Success, now()).unwrap(),
            AnswerResult::Resolved {
                user_id: "u1".to_string(),
                word_id: "w1".to_string(),
                level: ProficiencyLevel::L2,
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolved_session_is_gone() {
        let registry = SessionRegistry::new();
        let (id, _) = registry
            .start("u1", "w1", vec![ProficiencyLevel::L2], now())
            .unwrap();
        registry.submit(id, AnswerOutcome::Fail, now()).unwrap();

        let err = registry.submit(id, AnswerOutcome::Fail, now()).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_unknown_session() {
        let registry = SessionRegistry::new();
        assert!(matches!(
            registry.submit(Uuid::new_v4(), AnswerOutcome::Success, now()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_mastered_history_routes_to_flow2() {
        let registry = SessionRegistry::new();
        let history = vec![
            ProficiencyLevel::L2,
            ProficiencyLevel::L2,
            ProficiencyLevel::L1,
            ProficiencyLevel::L3,
        ];
        let (id, _) = registry.start("u1", "w1", history, now()).unwrap();
        assert_eq!(
            registry.submit(id, AnswerOutcome::Fail, now()).unwrap(),
            AnswerResult::Pending(Stage::Flow2TransEn)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_abandoned_sessions_are_swept() {
        let registry = SessionRegistry::new();
        registry.start("u1", "w1", vec![], now()).unwrap();
        registry.start("u1", "w2", vec![], later(10)).unwrap();
        assert_eq!(registry.len(), 2);

        // Only the first has been idle for the full TTL.
        registry.start("u2", "w1", vec![], later(30)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_expired_session_is_not_found() {
        let registry = SessionRegistry::with_ttl(Duration::from_secs(60));
        let (id, _) = registry.start("u1", "w1", vec![], now()).unwrap();

        let err = registry
            .submit(id, AnswerOutcome::Success, later(1))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_answers_keep_session_alive() {
        let registry = SessionRegistry::with_ttl(Duration::from_secs(5 * 60));
        let history = vec![
            ProficiencyLevel::L2,
            ProficiencyLevel::L2,
            ProficiencyLevel::L1,
            ProficiencyLevel::L3,
        ];
        let (id, _) = registry.start("u1", "w1", history, now()).unwrap();

        registry.submit(id, AnswerOutcome::Fail, later(4)).unwrap();
        let result = registry.submit(id, AnswerOutcome::Fail, later(8));
        assert!(!matches!(result, Err(ApiError::NotFound(_))));
    }
}
