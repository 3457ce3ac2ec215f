use ai_core::keys::{
    TUNING_DAMAGE_MULTIPLIER, TUNING_KEYS, TUNING_LEVEL, TUNING_PATTERN_COMPLEXITY,
    TUNING_REACTION_DELAY,
};
use ai_core::{Blackboard, BlackboardError};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, tags, TraceEvent};
use tracing::{debug, info};

use crate::config::{ConfigError, DifficultyConfig};
use crate::level::{DifficultyFactors, DifficultyLevel};
use crate::skill::NormalizedStats;
use crate::stats::{CombatEvent, CombatStats};

/// Outcome of one recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyUpdate {
    /// Skill measured from the statistics (before smoothing).
    pub measured: f32,
    /// Smoothed skill after this step.
    pub skill: f32,
    pub previous_level: DifficultyLevel,
    pub level: DifficultyLevel,
    pub factors: DifficultyFactors,
}

impl DifficultyUpdate {
    pub fn level_changed(&self) -> bool {
        self.level != self.previous_level
    }
}

/// Turns combat statistics into gradually changing tuning factors.
///
/// Never jumps: the smoothed skill and every factor move by at most
/// `max_step` per recompute, whatever the measured skill does.
#[derive(Debug, Clone)]
pub struct DifficultyDirector {
    config: DifficultyConfig,
    stats: CombatStats,
    skill: f32,
    level: DifficultyLevel,
    factors: DifficultyFactors,
    since_recompute: f32,
    recomputes: u64,
}

impl DifficultyDirector {
    pub fn new(config: DifficultyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let skill = config.initial_skill;
        let level = config.thresholds.level_for(skill);
        let factors = config.levels.get(level);
        Ok(Self {
            config,
            stats: CombatStats::default(),
            skill,
            level,
            factors,
            since_recompute: 0.0,
            recomputes: 0,
        })
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Smoothed skill in `[0, 1]`.
    pub fn skill(&self) -> f32 {
        self.skill
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    /// Factors currently applied.
    pub fn factors(&self) -> DifficultyFactors {
        self.factors
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    pub fn record(&mut self, event: CombatEvent) {
        self.stats.record(event);
    }

    /// Advance the recompute timer; recomputes once the interval has passed.
    pub fn update(&mut self, dt: f32) -> Option<DifficultyUpdate> {
        self.since_recompute += dt.max(0.0);
        if self.since_recompute < self.config.recompute_interval {
            return None;
        }
        self.since_recompute -= self.config.recompute_interval;
        Some(self.recompute())
    }

    /// Measure skill from the statistics and step toward it now.
    pub fn recompute(&mut self) -> DifficultyUpdate {
        let normalized = NormalizedStats::from_stats(&self.stats, &self.config.normalization);
        let measured = normalized.skill(&self.config.weights);
        let update = self.step_towards(measured);
        if let Some(retention) = self.config.history_retention {
            self.stats.decay(retention);
        }
        update
    }

    /// One smoothing step toward an externally measured skill score.
    pub fn step_towards(&mut self, measured: f32) -> DifficultyUpdate {
        let measured = measured.clamp(0.0, 1.0);
        let step = self.config.max_step;
        self.skill += (measured - self.skill).clamp(-step, step);

        let previous_level = self.level;
        self.level = self.config.thresholds.level_for(self.skill);
        self.factors = self
            .factors
            .step_towards(self.config.levels.get(self.level), step);
        self.recomputes += 1;

        debug!(
            measured,
            skill = self.skill,
            level = %self.level,
            "difficulty recomputed"
        );
        if self.level != previous_level {
            info!(from = %previous_level, to = %self.level, skill = self.skill, "difficulty level changed");
        }

        DifficultyUpdate {
            measured,
            skill: self.skill,
            previous_level,
            level: self.level,
            factors: self.factors,
        }
    }

    /// Write the current factors to `tuning.*` through a scoped writer.
    ///
    /// In-flight behaviors pick the new values up on their next read.
    pub fn apply(&self, blackboard: &mut Blackboard) -> Result<(), BlackboardError> {
        let level = self.level.index() as f32;
        let changed = blackboard.get(TUNING_LEVEL) != Some(level);

        let mut writer = blackboard.grant("difficulty", TUNING_KEYS);
        writer.set(TUNING_REACTION_DELAY, self.factors.reaction_delay)?;
        writer.set(TUNING_DAMAGE_MULTIPLIER, self.factors.damage_multiplier)?;
        writer.set(TUNING_PATTERN_COMPLEXITY, self.factors.pattern_complexity)?;
        writer.set(TUNING_LEVEL, level)?;

        if changed && trace_enabled(blackboard) {
            let now = blackboard.now();
            let skill_milli = (self.skill.clamp(0.0, 1.0) * 1000.0).round() as u64;
            trace_emit(
                blackboard,
                TraceEvent::new(now, tags::DIFFICULTY)
                    .with_a(self.level.index() as u64)
                    .with_b(skill_milli)
                    .with_detail(self.level.name()),
            );
        }
        Ok(())
    }
}
