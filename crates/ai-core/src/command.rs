//! Actuation commands.
//!
//! Agents never touch the world directly. Actions push [`Command`]s into the
//! agent's [`Commands`] buffer and the frame driver forwards them to an
//! [`ActuationSink`] once every agent has ticked. From the agent's point of view
//! commands are fire-and-forget.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Vec2;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    /// Steer toward `target` at `speed` units per second.
    MoveTo { target: Vec2, speed: f32 },
    Stop,
    /// Start the wind-up cue for an attack pattern.
    PlayTelegraph { pattern: Arc<str>, seconds: f32 },
    /// Apply an attack's effect.
    PlayAttack { pattern: Arc<str>, damage: f32 },
    /// Abort a pattern that was telegraphed or in progress.
    Interrupt { pattern: Arc<str> },
}

/// Reusable per-agent command buffer.
#[derive(Debug, Default, Clone)]
pub struct Commands {
    items: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.items.push(command);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.items
    }

    /// Take every buffered command, keeping the allocation for the next tick.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.items.drain(..)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Receiver for commands (animation/movement layer of the host engine).
pub trait ActuationSink<A> {
    fn apply(&mut self, agent: A, command: Command);
}

/// Collects commands in order; handy for tests and replays.
impl<A> ActuationSink<A> for Vec<(A, Command)> {
    fn apply(&mut self, agent: A, command: Command) {
        self.push((agent, command));
    }
}
