//! Declarative boss description and its load-time validation.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("boss `{boss}` declares no attack patterns")]
    NoPatterns { boss: String },

    #[error("boss `{boss}` declares no phases")]
    NoPhases { boss: String },

    #[error("pattern `{pattern}` is declared more than once")]
    DuplicatePattern { pattern: String },

    #[error("pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("phase `{phase}` is declared more than once")]
    DuplicatePhase { phase: String },

    #[error("phase `{phase}` has threshold {threshold}, expected a value in (0, 1]")]
    ThresholdOutOfRange { phase: String, threshold: f32 },

    #[error("phases `{phase}` and `{other}` share threshold {threshold}")]
    DuplicateThreshold {
        phase: String,
        other: String,
        threshold: f32,
    },

    #[error("phase `{phase}` enables unknown pattern `{pattern}`")]
    UnknownPattern { phase: String, pattern: String },

    #[error("boss `{boss}` has no phase `{phase}`")]
    UnknownPhase { boss: String, phase: String },
}

#[cfg(feature = "serde")]
fn one() -> f32 {
    1.0
}

/// One attack. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternConfig {
    pub id: String,
    pub cooldown: f32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub weight: f32,
    /// Wind-up between the cue and the hit; must be positive.
    pub telegraph: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub active: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: f32,
    /// `[0, 1]`; scaled down at low `tuning.pattern_complexity`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub complexity: f32,
    /// Only eligible while the player is at most this far away.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_range: Option<f32>,
}

impl PatternConfig {
    pub fn new(id: impl Into<String>, cooldown: f32, telegraph: f32) -> Self {
        Self {
            id: id.into(),
            cooldown,
            weight: 1.0,
            telegraph,
            active: 0.0,
            damage: 0.0,
            complexity: 0.0,
            max_range: None,
        }
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn active(mut self, seconds: f32) -> Self {
        self.active = seconds;
        self
    }

    pub fn damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn complexity(mut self, complexity: f32) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn max_range(mut self, range: f32) -> Self {
        self.max_range = Some(range);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidPattern {
            pattern: self.id.clone(),
            reason,
        };
        if self.id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !(self.cooldown.is_finite() && self.cooldown >= 0.0) {
            return Err(invalid("cooldown must be a non-negative number of seconds"));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(invalid("weight must be positive"));
        }
        if !(self.telegraph.is_finite() && self.telegraph > 0.0) {
            return Err(invalid("telegraph must be a positive number of seconds"));
        }
        if !(self.active.is_finite() && self.active >= 0.0) {
            return Err(invalid("active duration must not be negative"));
        }
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(invalid("damage must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.complexity) {
            return Err(invalid("complexity must be in [0, 1]"));
        }
        if self.max_range.is_some_and(|r| !(r.is_finite() && r > 0.0)) {
            return Err(invalid("max_range must be positive"));
        }
        Ok(())
    }
}

/// A health bracket and the patterns usable in it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseConfig {
    pub name: String,
    /// Health fraction at or below which this phase applies.
    pub threshold: f32,
    pub patterns: Vec<String>,
    /// Reset every cooldown when the phase is entered.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clear_cooldowns: bool,
}

impl PhaseConfig {
    pub fn new<I, S>(name: impl Into<String>, threshold: f32, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            threshold,
            patterns: patterns.into_iter().map(Into::into).collect(),
            clear_cooldowns: false,
        }
    }

    pub fn clear_cooldowns(mut self, clear: bool) -> Self {
        self.clear_cooldowns = clear;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BossConfig {
    pub name: String,
    pub patterns: Vec<PatternConfig>,
    /// Any order; sorted by descending threshold when loaded.
    pub phases: Vec<PhaseConfig>,
    /// Allow healing back into an earlier phase.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reversible_phases: bool,
}

impl BossConfig {
    /// Reject configurations no boss should run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::NoPatterns {
                boss: self.name.clone(),
            });
        }
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases {
                boss: self.name.clone(),
            });
        }

        let mut ids = BTreeSet::new();
        for pattern in &self.patterns {
            pattern.validate()?;
            if !ids.insert(pattern.id.as_str()) {
                return Err(ConfigError::DuplicatePattern {
                    pattern: pattern.id.clone(),
                });
            }
        }

        let mut names = BTreeSet::new();
        for (i, phase) in self.phases.iter().enumerate() {
            if !names.insert(phase.name.as_str()) {
                return Err(ConfigError::DuplicatePhase {
                    phase: phase.name.clone(),
                });
            }
            if !(phase.threshold > 0.0 && phase.threshold <= 1.0) {
                return Err(ConfigError::ThresholdOutOfRange {
                    phase: phase.name.clone(),
                    threshold: phase.threshold,
                });
            }
            if let Some(other) = self.phases[..i]
                .iter()
                .find(|p| p.threshold == phase.threshold)
            {
                return Err(ConfigError::DuplicateThreshold {
                    phase: phase.name.clone(),
                    other: other.name.clone(),
                    threshold: phase.threshold,
                });
            }
            if let Some(unknown) = phase.patterns.iter().find(|p| !ids.contains(p.as_str())) {
                return Err(ConfigError::UnknownPattern {
                    phase: phase.name.clone(),
                    pattern: unknown.clone(),
                });
            }
        }
        Ok(())
    }
}
