//! Adaptive spaced repetition algorithms.
//!
//! Each algorithm keeps its own memory state inside the opaque
//! `review_config` payload of a progress row, tagged with the algorithm's
//! name. The scheduler only threads that payload through.

pub mod fsrs;
pub mod sm2;

use crate::error::{CoreError, Result};
use crate::types::ProficiencyLevel;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one adaptive scheduling step.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveOutcome {
    pub review_config: Value,
    pub next_review_date: DateTime<Utc>,
    /// Algorithm-specific snapshot of the decision, kept in the schedule log.
    pub review_log: Option<Value>,
}

/// Trait for adaptive spaced repetition algorithms.
pub trait AdaptiveAlgorithm: Send + Sync {
    /// Algorithm identifier, matched against `ReviewStrategy::algorithm`.
    fn name(&self) -> &str;

    /// Compute the next memory state and review date after an assessment.
    fn schedule(
        &self,
        config: &Value,
        level: ProficiencyLevel,
        now: DateTime<Utc>,
    ) -> Result<AdaptiveOutcome>;
}

/// Named adaptive algorithms available to adaptive strategies.
pub struct AlgorithmRegistry {
    algorithms: Vec<Box<dyn AdaptiveAlgorithm>>,
}

impl AlgorithmRegistry {
    /// Registry with no algorithms.
    pub fn empty() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Add an algorithm, replacing any registered under the same name.
    pub fn register(&mut self, algorithm: Box<dyn AdaptiveAlgorithm>) {
        self.algorithms.retain(|a| a.name() != algorithm.name());
        self.algorithms.push(algorithm);
    }

    pub fn with(mut self, algorithm: Box<dyn AdaptiveAlgorithm>) -> Self {
        self.register(algorithm);
        self
    }

    /// Get algorithm by name.
    pub fn get(&self, name: &str) -> Option<&dyn AdaptiveAlgorithm> {
        self.algorithms
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }
}

/// Built-in `fsrs` and `sm2`.
impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::empty()
            .with(Box::new(fsrs::Fsrs::default()))
            .with(Box::new(sm2::Sm2::default()))
    }
}

#[derive(Serialize, Deserialize)]
struct TaggedState<T> {
    algorithm: String,
    state: T,
}

/// Decode an algorithm's memory state.
///
/// `null` means the word has none yet. State written by another algorithm
/// is ignored too, so a word moving between adaptive strategies starts
/// over rather than failing.
pub fn decode_state<T: DeserializeOwned>(algorithm: &str, config: &Value) -> Result<Option<T>> {
    if config.is_null() {
        return Ok(None);
    }
    let owner = config.get("algorithm").and_then(Value::as_str).ok_or_else(|| {
        CoreError::InvalidReviewConfig("memory state has no algorithm tag".to_string())
    })?;
    if owner != algorithm {
        return Ok(None);
    }

    serde_json::from_value::<TaggedState<T>>(config.clone())
        .map(|tagged| Some(tagged.state))
        .map_err(|e| CoreError::InvalidReviewConfig(e.to_string()))
}

pub fn encode_state<T: Serialize>(algorithm: &str, state: &T) -> Result<Value> {
    serde_json::to_value(TaggedState {
        algorithm: algorithm.to_string(),
        state,
    })
    .map_err(|e| CoreError::InvalidReviewConfig(e.to_string()))
}

/// `now` plus a fractional day count, to the millisecond.
///
/// Fails with `InvalidSchedule` when the result is not a representable
/// instant.
pub fn add_days(now: DateTime<Utc>, days: f64) -> Result<DateTime<Utc>> {
    let out_of_range =
        || CoreError::InvalidSchedule(format!("{days} days after {now} is out of range"));

    let millis = (days * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    let delta = Duration::try_milliseconds(millis as i64).ok_or_else(out_of_range)?;
    now.checked_add_signed(delta).ok_or_else(out_of_range)
}
