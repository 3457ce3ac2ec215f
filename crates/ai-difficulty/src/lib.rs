//! Adaptive difficulty: combat statistics in, tuning factors out.
//!
//! A [`DifficultyDirector`] accumulates [`CombatEvent`]s, periodically turns
//! them into a skill score, smooths it, maps it to a [`DifficultyLevel`] and
//! eases its [`DifficultyFactors`] toward that level's table. Consumers read
//! the factors lazily from the `tuning.*` blackboard keys.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod director;
pub mod level;
pub mod skill;
pub mod stats;

pub use config::{ConfigError, DifficultyConfig};
pub use director::{DifficultyDirector, DifficultyUpdate};
pub use level::{DifficultyFactors, DifficultyLevel, LevelThresholds, LevelTable};
pub use skill::{Normalization, NormalizedStats, SkillWeights};
pub use stats::{CombatEvent, CombatStats};
