//! Deterministic, engine-agnostic AI kernel primitives.
//!
//! Everything an agent needs to think for one tick lives here: the per-agent
//! [`Blackboard`], the [`TickContext`] handed down by the frame driver, the
//! read-only [`WorldView`] the agent observes, and the [`Command`] buffer it
//! writes actuation requests into.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod agent;
pub mod blackboard;
pub mod command;
pub mod keys;
pub mod math;
pub mod rng;
pub mod tick;
pub mod world;

pub use action::{Action, ActionFn, ActionStatus};
pub use agent::AgentId;
pub use blackboard::{
    BbKey, BbKind, BbType, BbValue, Blackboard, BlackboardError, Entry, Handle, ScopedWriter,
    SlotKey, Timestamp,
};
pub use command::{ActuationSink, Command, Commands};
pub use math::Vec2;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::WorldView;
