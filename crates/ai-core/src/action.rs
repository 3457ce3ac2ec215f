use crate::{Blackboard, BlackboardError, Commands, TickContext, WorldView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionStatus {
    Running,
    Success,
    Failure,
}

impl ActionStatus {
    pub fn is_running(self) -> bool {
        matches!(self, ActionStatus::Running)
    }
}

/// A leaf behavior that may span several ticks.
///
/// Contract:
/// - `tick` returns promptly; long work returns `Running` and continues next tick.
/// - After returning `Running`, the action must tolerate being ticked again
///   (resume) or cancelled; after a terminal status the next `tick` starts over.
/// - Side effects go through `commands`; the world is read-only.
/// - A `BlackboardError` means "could not evaluate" and is treated by the
///   caller as `Failure` for this tick.
pub trait Action<W>: 'static
where
    W: WorldView,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError>;

    /// Called when a running action is abandoned (preempted, timed out, halted).
    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) {
    }

    /// Upper bound on how long one run may stay `Running`, in seconds.
    fn max_duration(&self) -> Option<f32> {
        None
    }
}

/// Closure-backed action.
pub struct ActionFn<F> {
    f: F,
}

impl<F> ActionFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<W, F> Action<W> for ActionFn<F>
where
    W: WorldView,
    F: FnMut(
            &TickContext,
            W::Agent,
            &W,
            &mut Blackboard,
            &mut Commands,
        ) -> Result<ActionStatus, BlackboardError>
        + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        (self.f)(ctx, agent, world, blackboard, commands)
    }
}
