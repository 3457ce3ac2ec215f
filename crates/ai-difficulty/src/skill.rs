//! Statistics to skill score.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::stats::CombatStats;

/// Value used for a rate that has no samples yet.
pub const NEUTRAL: f32 = 0.5;

/// Per-statistic weights. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkillWeights {
    pub accuracy: f32,
    pub dodge: f32,
    pub parry: f32,
    pub duration: f32,
    pub survival: f32,
}

impl Default for SkillWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.30,
            dodge: 0.20,
            parry: 0.20,
            duration: 0.15,
            survival: 0.15,
        }
    }
}

impl SkillWeights {
    pub fn sum(&self) -> f32 {
        self.accuracy + self.dodge + self.parry + self.duration + self.survival
    }

    /// `(name, weight)` pairs, for validation and reporting.
    pub fn entries(&self) -> [(&'static str, f32); 5] {
        [
            ("accuracy", self.accuracy),
            ("dodge", self.dodge),
            ("parry", self.parry),
            ("duration", self.duration),
            ("survival", self.survival),
        ]
    }
}

/// Scales for the two unbounded statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Normalization {
    /// Average combat length that counts as zero skill; faster is better.
    pub reference_combat_seconds: f32,
    /// Death count that counts as zero survival.
    pub death_ceiling: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            reference_combat_seconds: 120.0,
            death_ceiling: 5.0,
        }
    }
}

/// Every statistic mapped to `[0, 1]`, higher meaning more skilled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedStats {
    pub accuracy: f32,
    pub dodge: f32,
    pub parry: f32,
    pub duration: f32,
    pub survival: f32,
}

impl NormalizedStats {
    pub fn from_stats(stats: &CombatStats, norm: &Normalization) -> Self {
        let duration = stats
            .average_combat_seconds()
            .map_or(NEUTRAL, |avg| {
                1.0 - (avg / norm.reference_combat_seconds).clamp(0.0, 1.0)
            });
        Self {
            accuracy: stats.accuracy().unwrap_or(NEUTRAL),
            dodge: stats.dodge_rate().unwrap_or(NEUTRAL),
            parry: stats.parry_rate().unwrap_or(NEUTRAL),
            duration,
            survival: 1.0 - (stats.deaths / norm.death_ceiling).clamp(0.0, 1.0),
        }
    }

    /// Weighted sum, clamped to `[0, 1]`.
    pub fn skill(&self, weights: &SkillWeights) -> f32 {
        let score = self.accuracy * weights.accuracy
            + self.dodge * weights.dodge
            + self.parry * weights.parry
            + self.duration * weights.duration
            + self.survival * weights.survival;
        score.clamp(0.0, 1.0)
    }
}
