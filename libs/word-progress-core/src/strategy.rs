//! Review strategy resolution.
//!
//! Each strategy declares an exact applicability predicate. Exactly one
//! strategy must match a scheduling context; anything else is a
//! configuration defect and is reported instead of guessed around.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::{ProficiencyLevel, ReviewStrategy, StrategyCondition, StrategyType};

/// Inputs the resolver matches strategies against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyContext {
    pub level: ProficiencyLevel,
    pub is_long_difficult: bool,
    pub history_length: usize,
}

impl fmt::Display for StrategyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {} (long-difficult: {}, history: {})",
            self.level, self.is_long_difficult, self.history_length
        )
    }
}

impl StrategyCondition {
    pub fn matches(&self, ctx: &StrategyContext) -> bool {
        let history = ctx.history_length as u64;
        self.levels.as_ref().map_or(true, |levels| levels.contains(&ctx.level))
            && self.is_long_difficult.map_or(true, |flag| flag == ctx.is_long_difficult)
            && self.min_history_length.map_or(true, |min| history >= min as u64)
            && self.max_history_length.map_or(true, |max| history <= max as u64)
    }
}

/// Longest ladder rung accepted, in days.
pub const MAX_INTERVAL_DAYS: f64 = 36500.0;

impl ReviewStrategy {
    /// Check that the strategy carries what its type needs.
    ///
    /// Whether an adaptive strategy's algorithm exists is up to the
    /// registry the scheduler is given.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| CoreError::InvalidStrategy {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        match self.strategy_type {
            StrategyType::Traditional => {
                if self.interval_rule.is_empty() {
                    return Err(invalid("interval ladder is empty"));
                }
                let in_range = |days: &f64| (0.0..=MAX_INTERVAL_DAYS).contains(days);
                if !self.interval_rule.iter().all(in_range) {
                    return Err(invalid("interval ladder has a rung outside 0 to 36500 days"));
                }
            }
            StrategyType::Adaptive => {
                if self.algorithm.as_deref().map_or(true, str::is_empty) {
                    return Err(invalid("adaptive strategy names no algorithm"));
                }
            }
        }
        Ok(())
    }
}

/// Select the single strategy whose condition matches `ctx`.
pub fn resolve<'a>(
    strategies: &'a [ReviewStrategy],
    ctx: &StrategyContext,
) -> Result<&'a ReviewStrategy> {
    let matching: Vec<&ReviewStrategy> = strategies
        .iter()
        .filter(|s| s.applicable_condition.matches(ctx))
        .collect();

    match matching.as_slice() {
        [] => Err(CoreError::NoApplicableStrategy {
            context: ctx.to_string(),
        }),
        [strategy] => {
            strategy.validate()?;
            Ok(*strategy)
        }
        many => Err(CoreError::AmbiguousStrategy {
            ids: many.iter().map(|s| s.id.clone()).collect(),
            context: ctx.to_string(),
        }),
    }
}

/// Built-in strategy set. The conditions partition every context.
pub fn default_strategies() -> Vec<ReviewStrategy> {
    vec![
        ReviewStrategy {
            id: "traditional-long-difficult".to_string(),
            strategy_type: StrategyType::Traditional,
            strategy_name: "Long-difficult word ladder".to_string(),
            applicable_condition: StrategyCondition {
                description: "long-difficult word, any level".to_string(),
                is_long_difficult: Some(true),
                ..Default::default()
            },
            interval_rule: vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0],
            algorithm: None,
        },
        ReviewStrategy {
            id: "traditional-fresh".to_string(),
            strategy_type: StrategyType::Traditional,
            strategy_name: "Forgetting curve ladder".to_string(),
            applicable_condition: StrategyCondition {
                description: "regular word + L0".to_string(),
                levels: Some(vec![ProficiencyLevel::L0]),
                is_long_difficult: Some(false),
                ..Default::default()
            },
            interval_rule: vec![1.0, 2.0, 4.0, 7.0, 15.0, 30.0],
            algorithm: None,
        },
        ReviewStrategy {
            id: "adaptive-fsrs".to_string(),
            strategy_type: StrategyType::Adaptive,
            strategy_name: "FSRS".to_string(),
            applicable_condition: StrategyCondition {
                description: "regular word + L1 or above".to_string(),
                levels: Some(vec![
                    ProficiencyLevel::L1,
                    ProficiencyLevel::L2,
                    ProficiencyLevel::L3,
                    ProficiencyLevel::L4,
                ]),
                is_long_difficult: Some(false),
                ..Default::default()
            },
            interval_rule: Vec::new(),
            algorithm: Some("fsrs".to_string()),
        },
    ]
}
