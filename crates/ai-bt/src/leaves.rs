//! Generic leaves driven by blackboard keys named at runtime.
//!
//! These back the built-in entries of [`NodeSpec`](crate::NodeSpec) so trees
//! loaded from config can gate on blackboard values without registering code.

use std::borrow::Cow;

use ai_core::{
    Action, ActionStatus, Blackboard, BlackboardError, Commands, TickContext, WorldView,
};

use crate::nodes::Condition;

/// Succeeds while a boolean key is `true`.
#[derive(Debug, Clone)]
pub struct FlagSet {
    pub key: Cow<'static, str>,
}

impl FlagSet {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self { key: key.into() }
    }
}

impl<W: WorldView> Condition<W> for FlagSet {
    fn check(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        blackboard: &Blackboard,
    ) -> Result<bool, BlackboardError> {
        blackboard.require_named::<bool>(&self.key)
    }
}

/// Compares a number key against a fixed threshold.
#[derive(Debug, Clone)]
pub struct Compare {
    pub key: Cow<'static, str>,
    pub threshold: f32,
    pub below: bool,
}

impl Compare {
    /// `key < threshold`
    pub fn below(key: impl Into<Cow<'static, str>>, threshold: f32) -> Self {
        Self {
            key: key.into(),
            threshold,
            below: true,
        }
    }

    /// `key > threshold`
    pub fn above(key: impl Into<Cow<'static, str>>, threshold: f32) -> Self {
        Self {
            key: key.into(),
            threshold,
            below: false,
        }
    }
}

impl<W: WorldView> Condition<W> for Compare {
    fn check(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        blackboard: &Blackboard,
    ) -> Result<bool, BlackboardError> {
        let value = blackboard.require_named::<f32>(&self.key)?;
        Ok(if self.below {
            value < self.threshold
        } else {
            value > self.threshold
        })
    }
}

/// Succeeds when the key exists and was written at most `max_age_ticks` ago.
/// A missing key is a plain failure, not an evaluation error.
#[derive(Debug, Clone)]
pub struct Fresh {
    pub key: Cow<'static, str>,
    pub max_age_ticks: u64,
}

impl Fresh {
    pub fn new(key: impl Into<Cow<'static, str>>, max_age_ticks: u64) -> Self {
        Self {
            key: key.into(),
            max_age_ticks,
        }
    }
}

impl<W: WorldView> Condition<W> for Fresh {
    fn check(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        blackboard: &Blackboard,
    ) -> Result<bool, BlackboardError> {
        Ok(blackboard
            .written_at(&self.key)
            .is_some_and(|at| blackboard.now().saturating_sub(at) <= self.max_age_ticks))
    }
}

/// Stays `Running` for a fixed number of seconds, then succeeds.
#[derive(Debug, Clone)]
pub struct Wait {
    seconds: f32,
    elapsed: Option<f32>,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            elapsed: None,
        }
    }
}

impl<W: WorldView> Action<W> for Wait {
    fn tick(
        &mut self,
        ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        let elapsed = self.elapsed.unwrap_or(0.0) + ctx.dt();
        if elapsed >= self.seconds {
            self.elapsed = None;
            return Ok(ActionStatus::Success);
        }
        self.elapsed = Some(elapsed);
        Ok(ActionStatus::Running)
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) {
        self.elapsed = None;
    }
}
