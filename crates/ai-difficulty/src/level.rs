use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DifficultyLevel {
    VeryEasy,
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::VeryEasy,
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DifficultyLevel::VeryEasy => "very_easy",
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower skill bounds of `Easy`, `Medium` and `Hard`; strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LevelThresholds(pub [f32; 3]);

impl Default for LevelThresholds {
    fn default() -> Self {
        Self([0.4, 0.6, 0.8])
    }
}

impl LevelThresholds {
    pub fn level_for(&self, skill: f32) -> DifficultyLevel {
        let passed = self.0.iter().filter(|&&t| skill >= t).count();
        DifficultyLevel::ALL[passed]
    }

    pub fn is_ordered(&self) -> bool {
        let [a, b, c] = self.0;
        0.0 < a && a < b && b < c && c < 1.0
    }
}

/// Tuning written to `tuning.*`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DifficultyFactors {
    /// Seconds before an agent reacts to a newly seen player.
    pub reaction_delay: f32,
    pub damage_multiplier: f32,
    /// `[0, 1]`
    pub pattern_complexity: f32,
}

impl DifficultyFactors {
    pub const fn new(reaction_delay: f32, damage_multiplier: f32, pattern_complexity: f32) -> Self {
        Self {
            reaction_delay,
            damage_multiplier,
            pattern_complexity,
        }
    }

    /// Move each factor toward `target` by at most `max_step`.
    pub fn step_towards(self, target: DifficultyFactors, max_step: f32) -> Self {
        fn approach(from: f32, to: f32, step: f32) -> f32 {
            from + (to - from).clamp(-step, step)
        }
        Self {
            reaction_delay: approach(self.reaction_delay, target.reaction_delay, max_step),
            damage_multiplier: approach(self.damage_multiplier, target.damage_multiplier, max_step),
            pattern_complexity: approach(
                self.pattern_complexity,
                target.pattern_complexity,
                max_step,
            ),
        }
    }
}

/// Target factors for each level, indexed by [`DifficultyLevel::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LevelTable(pub [DifficultyFactors; 4]);

impl Default for LevelTable {
    fn default() -> Self {
        Self([
            DifficultyFactors::new(0.6, 0.6, 0.25),
            DifficultyFactors::new(0.45, 0.8, 0.5),
            DifficultyFactors::new(0.3, 1.0, 0.75),
            DifficultyFactors::new(0.18, 1.25, 1.0),
        ])
    }
}

impl LevelTable {
    pub fn get(&self, level: DifficultyLevel) -> DifficultyFactors {
        self.0[level.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_lower_bounds() {
        let t = LevelThresholds::default();
        assert_eq!(t.level_for(0.0), DifficultyLevel::VeryEasy);
        assert_eq!(t.level_for(0.4), DifficultyLevel::Easy);
        assert_eq!(t.level_for(0.79), DifficultyLevel::Medium);
        assert_eq!(t.level_for(1.0), DifficultyLevel::Hard);
    }

    #[test]
    fn step_is_bounded_per_factor() {
        let from = DifficultyFactors::new(0.6, 0.6, 0.25);
        let to = DifficultyFactors::new(0.18, 1.25, 1.0);
        let next = from.step_towards(to, 0.15);
        assert!((next.reaction_delay - 0.45).abs() < 1e-6);
        assert!((next.damage_multiplier - 0.75).abs() < 1e-6);
        assert!((next.pattern_complexity - 0.4).abs() < 1e-6);
    }
}
