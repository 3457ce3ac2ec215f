//! Stock conditions over the perception, health and state keys.
//!
//! The free functions return plain blackboard predicates, usable both as
//! transition conditions and (through [`StandardConditions::register`]) as
//! named tree conditions.

use ai_bt::{Condition, ConditionFn, NodeRegistry};
use ai_core::keys::{
    AI_STATE, PLAYER_DISTANCE, PLAYER_HEARD, PLAYER_LAST_KNOWN, PLAYER_LAST_SEEN_AT, PLAYER_NOTICED,
    PLAYER_VISIBLE, SELF_HEALTH,
};
use ai_core::{BbKey, BbType, Blackboard, BlackboardError, TickContext, WorldView};

use crate::AiState;

/// Missing keys read as "not set"; a value of the wrong type is still an error.
fn optional<T: BbType>(bb: &Blackboard, key: BbKey<T>) -> Result<Option<T>, BlackboardError> {
    match bb.require(key) {
        Ok(value) => Ok(Some(value)),
        Err(BlackboardError::Missing { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn flag(key: BbKey<bool>) -> impl Fn(&Blackboard) -> Result<bool, BlackboardError> + Copy {
    move |bb: &Blackboard| optional(bb, key).map(|v| v.unwrap_or(false))
}

pub fn player_visible(bb: &Blackboard) -> bool {
    bb.get(PLAYER_VISIBLE).unwrap_or(false)
}

/// Visible for at least the reaction delay.
pub fn player_noticed(bb: &Blackboard) -> bool {
    bb.get(PLAYER_NOTICED).unwrap_or(false)
}

pub fn player_heard(bb: &Blackboard) -> bool {
    bb.get(PLAYER_HEARD).unwrap_or(false)
}

pub fn player_sensed(bb: &Blackboard) -> bool {
    player_visible(bb) || player_heard(bb)
}

/// Player distance is known and at most `range`.
pub fn in_range(range: f32) -> impl Fn(&Blackboard) -> bool + Copy {
    move |bb: &Blackboard| bb.get(PLAYER_DISTANCE).is_some_and(|d| d <= range)
}

/// Own health fraction strictly below `fraction`.
pub fn health_below(fraction: f32) -> impl Fn(&Blackboard) -> bool + Copy {
    move |bb: &Blackboard| bb.get(SELF_HEALTH).is_some_and(|h| h < fraction)
}

/// A last known position exists and is at most `ticks` old.
pub fn memory_fresh(ticks: u64) -> impl Fn(&Blackboard) -> bool + Copy {
    move |bb: &Blackboard| {
        bb.contains(PLAYER_LAST_KNOWN.name())
            && bb
                .get(PLAYER_LAST_SEEN_AT)
                .is_some_and(|at| at.age(bb.now()) <= ticks)
    }
}

/// The controller last recorded `state` on this blackboard.
pub fn in_state(state: AiState) -> impl Fn(&Blackboard) -> bool + Copy {
    move |bb: &Blackboard| bb.get(AI_STATE) == Some(state.handle())
}

fn blackboard_check<W, F>(check: F) -> impl Condition<W>
where
    W: WorldView,
    F: Fn(&Blackboard) -> Result<bool, BlackboardError> + 'static,
{
    ConditionFn::new(move |_: &TickContext, _: W::Agent, _: &W, bb: &Blackboard| check(bb))
}

/// Parameters for the named conditions most trees use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardConditions {
    pub attack_range: f32,
    /// Health fraction below which `health_low` holds.
    pub retreat_health: f32,
    /// How long (ticks) a sighting keeps `memory_fresh` true.
    pub memory_ticks: u64,
}

impl Default for StandardConditions {
    fn default() -> Self {
        Self {
            attack_range: 2.0,
            retreat_health: 0.25,
            memory_ticks: 300,
        }
    }
}

impl StandardConditions {
    pub const NAMES: &'static [&'static str] = &[
        "player_visible",
        "player_noticed",
        "player_heard",
        "player_sensed",
        "in_attack_range",
        "health_low",
        "memory_fresh",
        "in_state_idle",
        "in_state_patrol",
        "in_state_chase",
        "in_state_attack",
        "in_state_retreat",
        "in_state_search",
    ];

    /// Register every name in [`Self::NAMES`]. `in_state_<state>` gates a
    /// branch of a single-tree controller on its current [`AiState`].
    pub fn register<W: WorldView>(&self, registry: &mut NodeRegistry<W>) {
        let Self {
            attack_range,
            retreat_health,
            memory_ticks,
        } = *self;

        registry
            .register_condition("player_visible", || {
                blackboard_check::<W, _>(flag(PLAYER_VISIBLE))
            })
            .register_condition("player_noticed", || {
                blackboard_check::<W, _>(flag(PLAYER_NOTICED))
            })
            .register_condition("player_heard", || {
                blackboard_check::<W, _>(flag(PLAYER_HEARD))
            })
            .register_condition("player_sensed", || {
                blackboard_check::<W, _>(|bb: &Blackboard| {
                    Ok(flag(PLAYER_VISIBLE)(bb)? || flag(PLAYER_HEARD)(bb)?)
                })
            })
            .register_condition("in_attack_range", move || {
                blackboard_check::<W, _>(move |bb: &Blackboard| {
                    Ok(optional(bb, PLAYER_DISTANCE)?.is_some_and(|d| d <= attack_range))
                })
            })
            .register_condition("health_low", move || {
                blackboard_check::<W, _>(move |bb: &Blackboard| {
                    Ok(optional(bb, SELF_HEALTH)?.is_some_and(|h| h < retreat_health))
                })
            })
            .register_condition("memory_fresh", move || {
                blackboard_check::<W, _>(move |bb: &Blackboard| Ok(memory_fresh(memory_ticks)(bb)))
            });

        for state in AiState::ALL {
            registry.register_condition(format!("in_state_{}", state.name()), move || {
                blackboard_check::<W, _>(move |bb: &Blackboard| {
                    Ok(optional(bb, AI_STATE)? == Some(state.handle()))
                })
            });
        }
    }
}
