//! Guard actions the library crates do not ship, and the per-guard registry.

use std::sync::Arc;

use ai_agent::StandardConditions;
use ai_bt::NodeRegistry;
use ai_core::keys::{PLAYER_LAST_KNOWN, TUNING_DAMAGE_MULTIPLIER};
use ai_core::{Action, ActionStatus, Blackboard, BlackboardError, Command, Commands, TickContext};
use ai_nav::{MoveToAction, PatrolAction, SearchAction, Vec2};

use crate::config::GuardConfig;
use crate::world::SimWorld;

const ARRIVAL: f32 = 0.3;
const SEARCH_RADIUS: f32 = 3.0;
const SEARCH_PROBES: u32 = 3;

/// Melee swing: one `PlayAttack`, then Running through the recovery time.
#[derive(Debug, Clone)]
pub struct StrikeAction {
    damage: f32,
    recovery: f32,
    elapsed: Option<f32>,
}

impl StrikeAction {
    pub const PATTERN: &'static str = "strike";

    pub fn new(damage: f32, recovery: f32) -> Self {
        Self {
            damage,
            recovery: recovery.max(0.0),
            elapsed: None,
        }
    }
}

impl Action<SimWorld> for StrikeAction {
    fn tick(
        &mut self,
        ctx: &TickContext,
        _agent: u64,
        _world: &SimWorld,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        let elapsed = match self.elapsed {
            Some(elapsed) => elapsed + ctx.dt(),
            None => {
                let multiplier = blackboard.get(TUNING_DAMAGE_MULTIPLIER).unwrap_or(1.0);
                commands.push(Command::PlayAttack {
                    pattern: Arc::from(Self::PATTERN),
                    damage: self.damage * multiplier,
                });
                0.0
            }
        };
        if elapsed >= self.recovery {
            self.elapsed = None;
            Ok(ActionStatus::Success)
        } else {
            self.elapsed = Some(elapsed);
            Ok(ActionStatus::Running)
        }
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &SimWorld,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) {
        self.elapsed = None;
    }
}

/// Everything a guard tree may name: the standard conditions plus
/// `patrol`, `chase`, `search`, `retreat` and `strike`.
pub fn guard_registry(guard: &GuardConfig) -> NodeRegistry<SimWorld> {
    let mut registry = NodeRegistry::new();
    StandardConditions {
        attack_range: guard.attack_range,
        ..StandardConditions::default()
    }
    .register(&mut registry);

    let speed = guard.speed;
    let route: Vec<Vec2> = if guard.patrol.is_empty() {
        vec![guard.spawn]
    } else {
        guard.patrol.clone()
    };
    let home = guard.spawn;
    let reach = guard.attack_range * 0.8;
    let (damage, recovery) = (guard.strike_damage, guard.strike_cooldown);
    let chase_limit = guard.chase_limit;

    registry
        .register_action("patrol", move || {
            PatrolAction::new(route.clone(), speed, ARRIVAL)
        })
        .register_action("chase", move || {
            let chase = MoveToAction::to_key(PLAYER_LAST_KNOWN, speed, reach);
            match chase_limit {
                Some(seconds) => chase.with_max_duration(seconds),
                None => chase,
            }
        })
        .register_action("search", move || {
            SearchAction::new(SEARCH_RADIUS, SEARCH_PROBES, speed, ARRIVAL)
        })
        .register_action("retreat", move || {
            MoveToAction::to_point(home, speed, ARRIVAL)
        })
        .register_action("strike", move || StrikeAction::new(damage, recovery));
    registry
}
