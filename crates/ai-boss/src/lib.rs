//! Boss layer: health-threshold phases, weighted attack patterns with
//! cooldowns, and the telegraphed action that plays a pattern out.
//!
//! The [`PatternLayer`] lives on the boss's blackboard as an attachment
//! ([`BOSS_LAYER`]) so tree leaves can reach it; [`BossController`] advances
//! it between perception and the tree tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod config;
pub mod controller;
pub mod layer;
pub mod pattern;
pub mod phase;

pub use action::{boss_tree, register_boss_actions, ExecutePatternAction, RepositionAction};
pub use config::{BossConfig, ConfigError, PatternConfig, PhaseConfig};
pub use controller::{BossController, PhaseHook};
pub use layer::{PatternLayer, PhaseChange, BOSS_LAYER};
pub use pattern::{Pattern, PatternTable};
pub use phase::PhaseMachine;
