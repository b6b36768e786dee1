//! Assessment state machine.
//!
//! Walks a fixed graph of test stages to a terminal proficiency level:
//!
//! ```text
//! determinePath --isFlow1--> flow1_transEn --ok--> flow1_pronounce --ok--> L2
//!               |                          `-fail-> L0          `-fail-> L1
//!               |--isFlow2--> flow2_listen --ok--> L3
//!               |                         `-fail-> flow2_transEn --ok--> L2
//!               |                                               `-fail-> L0
//!               `--default--> flowDefault --ok--> L2
//!                                         `-fail-> L1
//! ```
//!
//! Routing out of `determinePath` only looks at the most recent history
//! entry and the history length.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::{AnswerOutcome, ProficiencyLevel};

/// Stage of an assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "determinePath")]
    DeterminePath,
    #[serde(rename = "flow1_transEn")]
    Flow1TransEn,
    #[serde(rename = "flow1_pronounce")]
    Flow1Pronounce,
    #[serde(rename = "flow2_listen")]
    Flow2Listen,
    #[serde(rename = "flow2_transEn")]
    Flow2TransEn,
    #[serde(rename = "flowDefault")]
    FlowDefault,
    #[serde(rename = "terminal")]
    Terminal(ProficiencyLevel),
}

impl Stage {
    pub fn level(&self) -> Option<ProficiencyLevel> {
        match self {
            Self::Terminal(level) => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeterminePath => f.write_str("determinePath"),
            Self::Flow1TransEn => f.write_str("flow1_transEn"),
            Self::Flow1Pronounce => f.write_str("flow1_pronounce"),
            Self::Flow2Listen => f.write_str("flow2_listen"),
            Self::Flow2TransEn => f.write_str("flow2_transEn"),
            Self::FlowDefault => f.write_str("flowDefault"),
            Self::Terminal(level) => write!(f, "{level}"),
        }
    }
}

/// Input signal for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentEvent {
    Start,
    Answer(AnswerOutcome),
}

impl fmt::Display for AssessmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("START"),
            Self::Answer(AnswerOutcome::Success) => f.write_str("answer(success)"),
            Self::Answer(AnswerOutcome::Fail) => f.write_str("answer(fail)"),
        }
    }
}

/// What a session reports after consuming an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Stage(Stage),
    Resolved(ProficiencyLevel),
}

type Guard = fn(&[ProficiencyLevel]) -> bool;

/// Routing guards out of `determinePath`, first match wins.
const ROUTES: [(Guard, Stage); 3] = [
    (is_flow1, Stage::Flow1TransEn),
    (is_flow2, Stage::Flow2Listen),
    (always, Stage::FlowDefault),
];

fn is_flow1(history: &[ProficiencyLevel]) -> bool {
    history.last().map_or(true, |last| *last == ProficiencyLevel::L0)
}

fn is_flow2(history: &[ProficiencyLevel]) -> bool {
    history.len() > 3
}

fn always(_: &[ProficiencyLevel]) -> bool {
    true
}

/// Stage entered on the START signal for the given history.
pub fn route(history: &[ProficiencyLevel]) -> Stage {
    ROUTES
        .iter()
        .find(|(guard, _)| guard(history))
        .map(|(_, stage)| *stage)
        .unwrap_or(Stage::FlowDefault)
}

/// Answer transition table. `None` for stages that take no answer.
fn answer_transition(stage: Stage, outcome: AnswerOutcome) -> Option<Stage> {
    use AnswerOutcome::{Fail, Success};
    use ProficiencyLevel::{L0, L1, L2, L3};

    let next = match (stage, outcome) {
        (Stage::Flow1TransEn, Success) => Stage::Flow1Pronounce,
        (Stage::Flow1TransEn, Fail) => Stage::Terminal(L0),
        (Stage::Flow1Pronounce, Success) => Stage::Terminal(L2),
        (Stage::Flow1Pronounce, Fail) => Stage::Terminal(L1),
        (Stage::Flow2Listen, Success) => Stage::Terminal(L3),
        (Stage::Flow2Listen, Fail) => Stage::Flow2TransEn,
        (Stage::Flow2TransEn, Success) => Stage::Terminal(L2),
        (Stage::Flow2TransEn, Fail) => Stage::Terminal(L0),
        (Stage::FlowDefault, Success) => Stage::Terminal(L2),
        (Stage::FlowDefault, Fail) => Stage::Terminal(L1),
        (Stage::DeterminePath | Stage::Terminal(_), _) => return None,
    };
    Some(next)
}

/// One run of the state machine over a fixed history.
///
/// A rejected event poisons the session: every later event is rejected too
/// and the caller has to start over from `determinePath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSession {
    history: Vec<ProficiencyLevel>,
    stage: Stage,
    poisoned: bool,
}

impl AssessmentSession {
    /// Create a session waiting for START.
    pub fn new(history: Vec<ProficiencyLevel>) -> Self {
        Self {
            history,
            stage: Stage::DeterminePath,
            poisoned: false,
        }
    }

    /// Create a session and route it immediately.
    pub fn start(history: Vec<ProficiencyLevel>) -> Self {
        let stage = route(&history);
        Self {
            history,
            stage,
            poisoned: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn resolved_level(&self) -> Option<ProficiencyLevel> {
        self.stage.level()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Feed one event to the session.
    pub fn send(&mut self, event: AssessmentEvent) -> Result<Step> {
        let next = if self.poisoned {
            None
        } else {
            match (self.stage, event) {
                (Stage::DeterminePath, AssessmentEvent::Start) => Some(route(&self.history)),
                (stage, AssessmentEvent::Answer(outcome)) => answer_transition(stage, outcome),
                (_, AssessmentEvent::Start) => None,
            }
        };

        let Some(next) = next else {
            self.poisoned = true;
            return Err(CoreError::InvalidTransition {
                stage: self.stage,
                event: event.to_string(),
            });
        };

        self.stage = next;
        Ok(match next {
            Stage::Terminal(level) => Step::Resolved(level),
            stage => Step::Stage(stage),
        })
    }

    pub fn submit_answer(&mut self, outcome: AnswerOutcome) -> Result<Step> {
        self.send(AssessmentEvent::Answer(outcome))
    }
}

/// Run a whole assessment: START followed by every answer in order.
pub fn assess(history: &[ProficiencyLevel], answers: &[AnswerOutcome]) -> Result<ProficiencyLevel> {
    let mut session = AssessmentSession::new(history.to_vec());
    session.send(AssessmentEvent::Start)?;
    for answer in answers {
        session.submit_answer(*answer)?;
    }
    session
        .resolved_level()
        .ok_or(CoreError::IncompleteAssessment {
            stage: session.stage(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use AnswerOutcome::{Fail, Success};
    use ProficiencyLevel::{L0, L1, L2, L3};

    fn started(history: &[ProficiencyLevel]) -> AssessmentSession {
        let mut session = AssessmentSession::new(history.to_vec());
        session.send(AssessmentEvent::Start).unwrap();
        session
    }

    #[test]
    fn empty_history_routes_to_flow1() {
        assert_eq!(started(&[]).stage(), Stage::Flow1TransEn);
    }

    #[test]
    fn last_level_zero_routes_to_flow1() {
        assert_eq!(route(&[L2, L0]), Stage::Flow1TransEn);
        assert_eq!(route(&[L0, L0, L0, L0]), Stage::Flow1TransEn);
        assert_eq!(route(&[L3, L2, L1, L2, L0]), Stage::Flow1TransEn);
    }

    #[test]
    fn long_history_routes_to_flow2() {
        assert_eq!(route(&[L2, L2, L1, L3]), Stage::Flow2Listen);
        assert_eq!(route(&[L0, L0, L0, L0, L1]), Stage::Flow2Listen);
    }

    #[test]
    fn short_history_routes_to_default() {
        assert_eq!(route(&[L1]), Stage::FlowDefault);
        assert_eq!(route(&[L0, L2]), Stage::FlowDefault);
        assert_eq!(route(&[L3, L3, L3]), Stage::FlowDefault);
    }

    #[test]
    fn start_applies_routing() {
        assert_eq!(AssessmentSession::start(vec![L1, L2]).stage(), Stage::FlowDefault);
    }

    #[test]
    fn flow1_success_success_resolves_l2() {
        let mut session = started(&[]);
        assert_eq!(session.submit_answer(Success).unwrap(), Step::Stage(Stage::Flow1Pronounce));
        assert_eq!(session.submit_answer(Success).unwrap(), Step::Resolved(L2));
        assert_eq!(session.resolved_level(), Some(L2));
    }

    #[test]
    fn terminal_levels_match_table() {
        let cases: &[(&[ProficiencyLevel], &[AnswerOutcome], ProficiencyLevel)] = &[
            (&[], &[Fail], L0),
            (&[], &[Success, Fail], L1),
            (&[], &[Success, Success], L2),
            (&[L0, L0, L0, L0], &[Fail], L0),
            (&[L2, L2, L1, L3], &[Success], L3),
            (&[L2, L2, L1, L3], &[Fail, Success], L2),
            (&[L2, L2, L1, L3], &[Fail, Fail], L0),
            (&[L2], &[Success], L2),
            (&[L2], &[Fail], L1),
        ];
        for (history, answers, expected) in cases {
            let level = assess(history, answers).unwrap();
            assert_eq!(level, *expected, "history {history:?} answers {answers:?}");
        }
    }

    #[test]
    fn answer_to_terminal_is_rejected() {
        let mut session = started(&[L1]);
        session.submit_answer(Success).unwrap();
        let err = session.submit_answer(Success).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidTransition {
                stage: Stage::Terminal(L2),
                event: "answer(success)".to_string(),
            }
        );
    }

    #[test]
    fn answer_before_start_is_rejected() {
        let mut session = AssessmentSession::new(vec![]);
        assert!(matches!(
            session.submit_answer(Fail),
            Err(CoreError::InvalidTransition { stage: Stage::DeterminePath, .. })
        ));
    }

    #[test]
    fn second_start_is_rejected_and_poisons() {
        let mut session = started(&[]);
        assert!(session.send(AssessmentEvent::Start).is_err());
        assert!(session.is_poisoned());
        assert!(session.submit_answer(Success).is_err());
        assert_eq!(session.stage(), Stage::Flow1TransEn);
    }

    #[test]
    fn unfinished_assessment_reports_stage() {
        assert_eq!(
            assess(&[], &[Success]),
            Err(CoreError::IncompleteAssessment { stage: Stage::Flow1Pronounce })
        );
    }

    #[test]
    fn extra_answers_are_rejected() {
        assert!(matches!(
            assess(&[L1], &[Success, Success]),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn no_transition_returns_to_determine_path() {
        let stages = [
            Stage::Flow1TransEn,
            Stage::Flow1Pronounce,
            Stage::Flow2Listen,
            Stage::Flow2TransEn,
            Stage::FlowDefault,
        ];
        for stage in stages {
            for outcome in [Success, Fail] {
                let next = answer_transition(stage, outcome).unwrap();
                assert_ne!(next, Stage::DeterminePath);
            }
        }
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Flow1TransEn.to_string(), "flow1_transEn");
        assert_eq!(Stage::Terminal(L3).to_string(), "L3");
        assert_eq!(serde_json::to_string(&Stage::FlowDefault).unwrap(), "\"flowDefault\"");
    }
}
