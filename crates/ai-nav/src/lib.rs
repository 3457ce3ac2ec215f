//! Pathfinding interface and reference movement actions.
//!
//! Pathfinding itself is a collaborator: hosts plug their own backend in
//! through [`Navigator`]. [`NavGrid`] (A* on a uniform grid) and [`OpenField`]
//! (straight lines) are small reference backends for tests and the simulator.
//!
//! Movement actions never move the agent; they emit
//! [`Command::MoveTo`](ai_core::Command::MoveTo) and watch the position the
//! world reports back on later ticks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
pub mod grid;
pub mod navigator;
pub mod world;

pub use actions::{MoveTarget, MoveToAction, PatrolAction, SearchAction};
pub use ai_core::Vec2;
pub use grid::{NavGrid, NavGridError};
pub use navigator::{NavPath, Navigator, OpenField};
pub use world::NavWorldView;
