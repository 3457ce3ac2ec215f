//! Leaves that run the boss layer inside a behavior tree.

use std::sync::Arc;

use ai_bt::{BehaviorTree, BuildError, NodeRegistry, TreeBuilder};
use ai_core::keys::{
    PLAYER_DISTANCE, PLAYER_LAST_KNOWN, TUNING_DAMAGE_MULTIPLIER, TUNING_PATTERN_COMPLEXITY,
};
use ai_core::{
    Action, ActionStatus, Blackboard, BlackboardError, Command, Commands, DeterministicRng,
    TickContext,
};
use ai_nav::{MoveTarget, MoveToAction, NavWorldView, Vec2};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, tags, TraceEvent};
use tracing::debug;

use crate::layer::BOSS_LAYER;

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Idle,
    Telegraph { pattern: Arc<str>, elapsed: f32 },
    Active { pattern: Arc<str>, elapsed: f32 },
}

/// Pick a pattern from the boss layer and play it out.
///
/// Emits [`Command::PlayTelegraph`], waits the pattern's telegraph delay,
/// emits [`Command::PlayAttack`] with damage scaled by
/// `tuning.damage_multiplier`, stays `Running` for the active duration, then
/// succeeds. `Failure` when no pattern is usable, so a sibling can take over.
/// Cancelling between cue and end emits [`Command::Interrupt`].
#[derive(Debug, Clone)]
pub struct ExecutePatternAction {
    stage: Stage,
    telegraph: f32,
    active: f32,
    damage: f32,
}

impl Default for ExecutePatternAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutePatternAction {
    pub fn new() -> Self {
        Self {
            stage: Stage::Idle,
            telegraph: 0.0,
            active: 0.0,
            damage: 0.0,
        }
    }

    /// Pattern currently being played, if any.
    pub fn current(&self) -> Option<&str> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Telegraph { pattern, .. } | Stage::Active { pattern, .. } => Some(pattern),
        }
    }

    fn start(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        let tuning = blackboard.get(TUNING_PATTERN_COMPLEXITY).unwrap_or(1.0);
        let distance = blackboard.get(PLAYER_DISTANCE);
        let layer = blackboard
            .attachment_mut(BOSS_LAYER)
            .ok_or_else(|| BlackboardError::Missing {
                key: "boss.layer".into(),
            })?;

        let picked = layer.select(tuning, distance).and_then(|index| {
            let pattern = layer.trigger(index)?;
            Some((index, pattern.clone()))
        });
        let phase = layer.phase();
        let Some((index, pattern)) = picked else {
            if trace_enabled(blackboard) {
                trace_emit(
                    blackboard,
                    TraceEvent::new(ctx.tick, tags::FALLBACK).with_a(phase as u64),
                );
            }
            return Ok(ActionStatus::Failure);
        };

        debug!(pattern = %pattern.id, phase, "boss pattern selected");
        commands.push(Command::PlayTelegraph {
            pattern: pattern.id.clone(),
            seconds: pattern.telegraph,
        });
        if trace_enabled(blackboard) {
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, tags::PATTERN)
                    .with_a(index as u64)
                    .with_b(phase as u64)
                    .with_detail(pattern.id.to_string()),
            );
        }
        self.telegraph = pattern.telegraph;
        self.active = pattern.active;
        self.damage = pattern.damage;
        self.stage = Stage::Telegraph {
            pattern: pattern.id,
            elapsed: 0.0,
        };
        Ok(ActionStatus::Running)
    }
}

impl<W> Action<W> for ExecutePatternAction
where
    W: NavWorldView,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        match &mut self.stage {
            Stage::Idle => self.start(ctx, blackboard, commands),
            Stage::Telegraph { pattern, elapsed } => {
                *elapsed += ctx.dt();
                if *elapsed < self.telegraph {
                    return Ok(ActionStatus::Running);
                }
                let multiplier = blackboard.get(TUNING_DAMAGE_MULTIPLIER).unwrap_or(1.0);
                let pattern = pattern.clone();
                commands.push(Command::PlayAttack {
                    pattern: pattern.clone(),
                    damage: self.damage * multiplier,
                });
                if self.active <= 0.0 {
                    self.stage = Stage::Idle;
                    return Ok(ActionStatus::Success);
                }
                self.stage = Stage::Active {
                    pattern,
                    elapsed: 0.0,
                };
                Ok(ActionStatus::Running)
            }
            Stage::Active { elapsed, .. } => {
                *elapsed += ctx.dt();
                if *elapsed < self.active {
                    return Ok(ActionStatus::Running);
                }
                self.stage = Stage::Idle;
                Ok(ActionStatus::Success)
            }
        }
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        if let Stage::Telegraph { pattern, .. } | Stage::Active { pattern, .. } =
            std::mem::replace(&mut self.stage, Stage::Idle)
        {
            commands.push(Command::Interrupt { pattern });
        }
    }
}

/// Step away to a random spot on a ring around the player's last known
/// position. The boss's low-cost filler while every pattern cools down.
#[derive(Debug, Clone)]
pub struct RepositionAction {
    distance: f32,
    leg: MoveToAction,
    moving: bool,
}

impl RepositionAction {
    /// RNG stream reserved for reposition targets.
    pub const RNG_STREAM: u64 = 0xB055_2E90;
    pub const MAX_SECONDS: f32 = 3.0;

    pub fn new(distance: f32, speed: f32, arrival_distance: f32) -> Self {
        Self {
            distance: distance.max(0.0),
            leg: MoveToAction::to_point(Vec2::ZERO, speed, arrival_distance),
            moving: false,
        }
    }
}

impl<W> Action<W> for RepositionAction
where
    W: NavWorldView,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        if !self.moving {
            let anchor = blackboard.require(PLAYER_LAST_KNOWN)?;
            let mut rng =
                ctx.rng_for_agent(agent, Self::RNG_STREAM ^ ctx.tick.rotate_left(17));
            let angle = rng.next_range_f32(0.0, std::f32::consts::TAU);
            let goal = anchor + Vec2::new(angle.cos(), angle.sin()) * self.distance;
            self.leg.retarget(MoveTarget::Point(goal));
            self.moving = true;
        }
        let status = Action::<W>::tick(&mut self.leg, ctx, agent, world, blackboard, commands)?;
        if status != ActionStatus::Running {
            self.moving = false;
        }
        Ok(status)
    }

    fn cancel(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        self.moving = false;
        Action::<W>::cancel(&mut self.leg, ctx, agent, world, blackboard, commands);
    }

    /// A blocked route should not pin the boss in place.
    fn max_duration(&self) -> Option<f32> {
        Some(Self::MAX_SECONDS)
    }
}

/// Register `execute_pattern` and `reposition` for tree specs.
pub fn register_boss_actions<W: NavWorldView>(
    registry: &mut NodeRegistry<W>,
    reposition: RepositionAction,
) {
    registry
        .register_action("execute_pattern", ExecutePatternAction::new)
        .register_action("reposition", move || reposition.clone());
}

/// Default boss tree: try a pattern every tick, reposition while none is
/// usable. A pattern that becomes usable preempts the reposition.
pub fn boss_tree<W: NavWorldView>(
    name: &'static str,
    reposition: RepositionAction,
) -> Result<BehaviorTree<W>, BuildError> {
    TreeBuilder::<W>::new(name)
        .reactive_selector(name)
        .action("execute_pattern", ExecutePatternAction::new())
        .action("reposition", reposition)
        .end()
        .build()
}
