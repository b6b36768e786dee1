//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with configurable parameters.

use super::{add_days, decode_state, encode_state, AdaptiveAlgorithm, AdaptiveOutcome};
use crate::error::Result;
use crate::types::{ProficiencyLevel, Rating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const NAME: &str = "sm2";

/// SM-2 memory state stored in `review_config`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sm2Memory {
    pub ease_factor: f64,
    pub interval_days: f64,
    pub repetitions: u32,
    pub lapses: u32,
}

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub easy_bonus: f64,
    pub hard_multiplier: f64,
    pub graduating_interval: f64,
    pub easy_interval: f64,
    /// Longest interval in days a review can be pushed out to.
    pub maximum_interval: f64,
    /// Retry delay in days while the word is still being learned.
    pub learning_interval: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            easy_bonus: 1.3,
            hard_multiplier: 1.2,
            graduating_interval: 1.0,
            easy_interval: 4.0,
            maximum_interval: 36500.0,
            learning_interval: 10.0 / 1440.0,
        }
    }
}

impl AdaptiveAlgorithm for Sm2 {
    fn name(&self) -> &str {
        NAME
    }

    fn schedule(
        &self,
        config: &Value,
        level: ProficiencyLevel,
        now: DateTime<Utc>,
    ) -> Result<AdaptiveOutcome> {
        let rating = Rating::from_level(level).to_value();
        let state = decode_state::<Sm2Memory>(NAME, config)?.unwrap_or(Sm2Memory {
            ease_factor: self.initial_ease,
            interval_days: 0.0,
            repetitions: 0,
            lapses: 0,
        });

        let next = if state.repetitions == 0 {
            self.schedule_learning(&state, rating)
        } else {
            self.schedule_review(&state, rating)
        };

        Ok(AdaptiveOutcome {
            review_config: encode_state(NAME, &next)?,
            next_review_date: add_days(now, next.interval_days)?,
            review_log: Some(json!({
                "algorithm": "sm2",
                "rating": rating,
                "interval_before": state.interval_days,
                "interval_after": next.interval_days,
                "ease_before": state.ease_factor,
                "ease_after": next.ease_factor,
            })),
        })
    }
}

impl Sm2 {
    fn schedule_learning(&self, state: &Sm2Memory, rating: u8) -> Sm2Memory {
        if rating >= 3 {
            let interval = if rating == 4 {
                self.easy_interval
            } else {
                self.graduating_interval
            };
            Sm2Memory {
                interval_days: interval,
                repetitions: 1,
                ..*state
            }
        } else {
            Sm2Memory {
                interval_days: self.learning_interval,
                ..*state
            }
        }
    }

    fn schedule_review(&self, state: &Sm2Memory, rating: u8) -> Sm2Memory {
        if rating == 1 {
            // Lapse: back to learning
            return Sm2Memory {
                ease_factor: (state.ease_factor - 0.2).max(self.minimum_ease),
                interval_days: self.learning_interval,
                repetitions: 0,
                lapses: state.lapses + 1,
            };
        }

        let ease_adj = match rating {
            2 => -0.15,
            4 => 0.15,
            _ => 0.0,
        };
        let multiplier = match rating {
            2 => self.hard_multiplier,
            4 => state.ease_factor * self.easy_bonus,
            _ => state.ease_factor,
        };
        Sm2Memory {
            ease_factor: (state.ease_factor + ease_adj).max(self.minimum_ease),
            interval_days: (state.interval_days * multiplier)
                .max(1.0)
                .min(self.maximum_interval),
            repetitions: state.repetitions + 1,
            lapses: state.lapses,
        }
    }
}
