//! Headless encounter simulator.
//!
//! Loads an [`EncounterConfig`], builds one controller per guard (and the
//! boss, if any), and steps them against a grid arena with a scripted player.
//! Combat outcomes feed the difficulty director, whose tuning is written back
//! into every agent's blackboard.

#![forbid(unsafe_code)]

pub mod actions;
pub mod combat;
pub mod config;
pub mod sim;
pub mod trace;
pub mod world;

pub use config::EncounterConfig;
pub use sim::{Report, Simulation};
pub use trace::JsonLinesSink;
pub use world::SimWorld;
