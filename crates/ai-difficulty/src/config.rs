#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::level::{DifficultyLevel, LevelTable, LevelThresholds};
use crate::skill::{Normalization, SkillWeights};

/// Allowed drift of the weight sum from 1.
pub const WEIGHT_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("skill weights sum to {sum}, expected 1.0")]
    WeightSum { sum: f32 },

    #[error("skill weight `{stat}` is {weight}, expected a non-negative number")]
    InvalidWeight { stat: &'static str, weight: f32 },

    #[error("level thresholds {thresholds:?} must be strictly increasing inside (0, 1)")]
    Thresholds { thresholds: [f32; 3] },

    #[error("`{field}` is {value}: {reason}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("{level} factors are invalid: {reason}")]
    Factors {
        level: DifficultyLevel,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DifficultyConfig {
    pub weights: SkillWeights,
    pub normalization: Normalization,
    pub thresholds: LevelThresholds,
    pub levels: LevelTable,
    /// Seconds between recomputations.
    pub recompute_interval: f32,
    /// Largest change of the smoothed skill and of each factor per recompute.
    pub max_step: f32,
    pub initial_skill: f32,
    /// Fraction of statistics kept after each recompute; `None` keeps everything.
    pub history_retention: Option<f32>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            weights: SkillWeights::default(),
            normalization: Normalization::default(),
            thresholds: LevelThresholds::default(),
            levels: LevelTable::default(),
            recompute_interval: 30.0,
            max_step: 0.15,
            initial_skill: 0.5,
            history_retention: None,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            reason: "expected a positive number",
        })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            reason: "expected a value in [0, 1]",
        })
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (stat, weight) in self.weights.entries() {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ConfigError::InvalidWeight { stat, weight });
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }
        if !self.thresholds.is_ordered() {
            return Err(ConfigError::Thresholds {
                thresholds: self.thresholds.0,
            });
        }
        for level in DifficultyLevel::ALL {
            let f = self.levels.get(level);
            let reason = if !(f.reaction_delay.is_finite() && f.reaction_delay >= 0.0) {
                Some("reaction delay must not be negative")
            } else if !(f.damage_multiplier.is_finite() && f.damage_multiplier > 0.0) {
                Some("damage multiplier must be positive")
            } else if !(0.0..=1.0).contains(&f.pattern_complexity) {
                Some("pattern complexity must be in [0, 1]")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::Factors { level, reason });
            }
        }
        positive("recompute_interval", self.recompute_interval)?;
        positive("max_step", self.max_step)?;
        positive(
            "normalization.reference_combat_seconds",
            self.normalization.reference_combat_seconds,
        )?;
        positive("normalization.death_ceiling", self.normalization.death_ceiling)?;
        unit("initial_skill", self.initial_skill)?;
        if let Some(retention) = self.history_retention {
            unit("history_retention", retention)?;
        }
        Ok(())
    }
}
