//! FSRS (Free Spaced Repetition Scheduler) algorithm.
//!
//! Modern algorithm based on memory research using DSR model:
//! - Difficulty (D): Word difficulty 1-10
//! - Stability (S): Days until retention drops to target
//! - Retrievability (R): Probability of recall

use super::{add_days, decode_state, encode_state, AdaptiveAlgorithm, AdaptiveOutcome};
use crate::error::Result;
use crate::types::{ProficiencyLevel, Rating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const NAME: &str = "fsrs";

/// FSRS memory state stored in `review_config`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FsrsMemory {
    pub stability: f64,
    pub difficulty: f64,
    pub last_review: DateTime<Utc>,
    pub reps: u32,
    pub lapses: u32,
}

/// FSRS algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Fsrs {
    pub request_retention: f64,
    pub maximum_interval: f64,
    /// FSRS-4.5 parameters (17 weights).
    pub w: [f64; 17],
}

impl Default for Fsrs {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: 36500.0,
            w: [
                0.4, 0.6, 2.4, 5.8, // w[0-3]: initial stability for Again, Hard, Good, Easy
                4.93,  // w[4]: initial difficulty base
                0.94,  // w[5]: initial difficulty modifier
                0.86,  // w[6]: difficulty decay
                0.01,  // w[7]: mean reversion weight
                1.49,  // w[8]: stability exp base
                0.14,  // w[9]: stability decay
                0.94,  // w[10]: retrievability effect
                2.18,  // w[11]: forget stability base
                0.05,  // w[12]: difficulty on forget
                0.34,  // w[13]: stability on forget
                1.26,  // w[14]: retrievability on forget
                0.29,  // w[15]: hard penalty
                2.61,  // w[16]: easy bonus
            ],
        }
    }
}

impl AdaptiveAlgorithm for Fsrs {
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
        let previous: Option<FsrsMemory> = decode_state(NAME, config)?;

        let (memory, elapsed, retrievability) = match previous {
            None => (self.first_memory(rating, now), 0.0, None),
            Some(prev) => {
                let elapsed = Self::elapsed_days(&prev, now);
                let r = self.retrievability(elapsed, prev.stability);
                (self.next_memory(&prev, rating, r, now), elapsed, Some(r))
            }
        };

        let interval = if rating == 1 {
            self.relearn_interval(memory.stability)
        } else {
            self.interval_from_stability(memory.stability)
        };

        Ok(AdaptiveOutcome {
            review_config: encode_state(NAME, &memory)?,
            next_review_date: add_days(now, interval)?,
            review_log: Some(json!({
                "algorithm": NAME,
                "rating": rating,
                "elapsed_days": elapsed,
                "retrievability": retrievability,
                "stability": memory.stability,
                "difficulty": memory.difficulty,
                "interval_days": interval,
            })),
        })
    }
}

impl Fsrs {
    /// Stability after a word's first assessment: `w[0..4]` indexed by grade.
    fn initial_stability(&self, rating: u8) -> f64 {
        let index = (rating.saturating_sub(1)) as usize;
        self.w[index.min(3)].max(0.1)
    }

    /// D0(G) = w[4] - w[5] * (G - 3). An L0 word starts hard, L3+ starts easy.
    fn initial_difficulty(&self, rating: u8) -> f64 {
        let d0 = self.w[4] - self.w[5] * (rating as f64 - 3.0);
        d0.clamp(1.0, 10.0)
    }

    /// Pull difficulty back towards the grade's starting value, then shift
    /// it by how far the grade was from Good.
    fn next_difficulty(&self, current: f64, rating: u8) -> f64 {
        let anchored = self.w[7] * self.initial_difficulty(rating) + (1.0 - self.w[7]) * current;
        (anchored - self.w[6] * (rating as f64 - 3.0)).clamp(1.0, 10.0)
    }

    /// Probability the learner still knows the word `elapsed_days` after
    /// the last assessment: R = 1 / (1 + t / 9S).
    fn retrievability(&self, elapsed_days: f64, stability: f64) -> f64 {
        if stability <= 0.0 {
            return 0.0;
        }
        1.0 / (1.0 + elapsed_days / (9.0 * stability))
    }

    /// Stability after a passed assessment. Growth is larger for words that
    /// are easy, not yet stable, and close to being forgotten.
    fn next_stability_recall(
        &self,
        stability: f64,
        difficulty: f64,
        retrievability: f64,
        rating: u8,
    ) -> f64 {
        let ease = (11.0 - difficulty).max(0.1);
        let saturation = stability.powf(-self.w[9]);
        let surprise = (self.w[10] * (1.0 - retrievability)).exp() - 1.0;
        let grade = match rating {
            2 => self.w[15],
            4 => self.w[16],
            _ => 1.0,
        };

        let growth = self.w[8].exp() * ease * saturation * surprise + 1.0;
        (stability * growth * grade).max(0.1).min(self.maximum_interval)
    }

    /// Stability after an L0 assessment. Never above the previous value.
    fn next_stability_forget(&self, stability: f64, difficulty: f64, retrievability: f64) -> f64 {
        let hardness = difficulty.max(1.0).powf(-self.w[12]);
        let kept = (stability + 1.0).powf(self.w[13]) - 1.0;
        let surprise = (self.w[14] * (1.0 - retrievability)).exp();

        (self.w[11] * hardness * kept * surprise).max(0.1).min(stability)
    }

    /// Days until retrievability falls to `request_retention`.
    fn interval_from_stability(&self, stability: f64) -> f64 {
        if self.request_retention <= 0.0 || self.request_retention >= 1.0 {
            return stability.max(1.0).min(self.maximum_interval);
        }
        let interval = 9.0 * stability * (1.0 / self.request_retention - 1.0);
        interval.max(1.0).min(self.maximum_interval)
    }

    /// Same-day retry for a forgotten word, 10 minutes up to a day.
    fn relearn_interval(&self, stability: f64) -> f64 {
        (stability * 60.0).clamp(10.0, 1440.0) / 1440.0
    }

    fn elapsed_days(memory: &FsrsMemory, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(memory.last_review);
        (elapsed.num_seconds() as f64 / 86400.0).max(0.0)
    }

    fn first_memory(&self, rating: u8, now: DateTime<Utc>) -> FsrsMemory {
        FsrsMemory {
            stability: self.initial_stability(rating),
            difficulty: self.initial_difficulty(rating),
            last_review: now,
            reps: 1,
            lapses: u32::from(rating == 1),
        }
    }

    fn next_memory(
        &self,
        prev: &FsrsMemory,
        rating: u8,
        retrievability: f64,
        now: DateTime<Utc>,
    ) -> FsrsMemory {
        let (stability, lapses) = if rating == 1 {
            (
                self.next_stability_forget(prev.stability, prev.difficulty, retrievability),
                prev.lapses + 1,
            )
        } else {
            (
                self.next_stability_recall(prev.stability, prev.difficulty, retrievability, rating),
                prev.lapses,
            )
        };

        FsrsMemory {
            stability,
            difficulty: self.next_difficulty(prev.difficulty, rating),
            last_review: now,
            reps: prev.reps + 1,
            lapses,
        }
    }
}
