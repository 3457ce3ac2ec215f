//! Agent layer: perception refresh, the discrete AI state machine and the
//! controller that ties a blackboard to one or more behavior trees.
//!
//! Per tick a controller (1) stamps its blackboard clock and refreshes the
//! perception keys, (2) ticks the active tree, (3) evaluates state
//! transitions. [`tick_agents`] drives many controllers against one
//! read-only world snapshot and forwards their commands afterwards.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod conditions;
pub mod controller;
pub mod driver;
pub mod perception;
pub mod state;
pub mod transitions;

pub use conditions::StandardConditions;
pub use controller::{AiController, ControllerError};
pub use driver::{tick_agents, Controller};
pub use perception::{refresh_perception, SenseWorldView, DEFAULT_REACTION_DELAY};
pub use state::AiState;
pub use transitions::{Guard, Transition, TransitionSpec, TransitionTable};
