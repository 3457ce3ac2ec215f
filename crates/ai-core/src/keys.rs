//! Well-known blackboard keys shared across subsystems.
//!
//! Perception owns the `self.*` and `player.*` keys, the difficulty director
//! owns `tuning.*`, the controller owns `ai.*` and the boss layer `boss.*`.
//! Each owner writes through a [`ScopedWriter`](crate::ScopedWriter) granted
//! on the matching `*_KEYS` list.

use crate::{BbKey, Handle, Timestamp, Vec2};

pub const SELF_POSITION: BbKey<Vec2> = BbKey::new("self.position");
/// Health as a fraction of maximum, `[0, 1]`.
pub const SELF_HEALTH: BbKey<f32> = BbKey::new("self.health");

pub const PLAYER: BbKey<Handle> = BbKey::new("player.id");
pub const PLAYER_VISIBLE: BbKey<bool> = BbKey::new("player.visible");
pub const PLAYER_HEARD: BbKey<bool> = BbKey::new("player.heard");
/// Seconds the player has been continuously visible.
pub const PLAYER_VISIBLE_FOR: BbKey<f32> = BbKey::new("player.visible_for");
/// Visible for at least the current reaction delay.
pub const PLAYER_NOTICED: BbKey<bool> = BbKey::new("player.noticed");
/// Present only on ticks where the player is seen or heard.
pub const PLAYER_POSITION: BbKey<Vec2> = BbKey::new("player.position");
/// Present only on ticks where the player is seen or heard.
pub const PLAYER_DISTANCE: BbKey<f32> = BbKey::new("player.distance");
pub const PLAYER_LAST_KNOWN: BbKey<Vec2> = BbKey::new("player.last_known");
pub const PLAYER_LAST_SEEN_AT: BbKey<Timestamp> = BbKey::new("player.last_seen_at");

pub const PERCEPTION_KEYS: &[&str] = &[
    "self.position",
    "self.health",
    "player.id",
    "player.visible",
    "player.heard",
    "player.visible_for",
    "player.noticed",
    "player.position",
    "player.distance",
    "player.last_known",
    "player.last_seen_at",
];

/// Seconds an agent waits before reacting to a newly visible player.
pub const TUNING_REACTION_DELAY: BbKey<f32> = BbKey::new("tuning.reaction_delay");
pub const TUNING_DAMAGE_MULTIPLIER: BbKey<f32> = BbKey::new("tuning.damage_multiplier");
/// `[0, 1]`: how freely complex attack patterns are chosen.
pub const TUNING_PATTERN_COMPLEXITY: BbKey<f32> = BbKey::new("tuning.pattern_complexity");
pub const TUNING_LEVEL: BbKey<f32> = BbKey::new("tuning.level");

pub const TUNING_KEYS: &[&str] = &[
    "tuning.reaction_delay",
    "tuning.damage_multiplier",
    "tuning.pattern_complexity",
    "tuning.level",
];

/// Discrete controller state, stored as its handle.
pub const AI_STATE: BbKey<Handle> = BbKey::new("ai.state");
pub const AI_STATE_SINCE: BbKey<Timestamp> = BbKey::new("ai.state_since");

pub const CONTROLLER_KEYS: &[&str] = &["ai.state", "ai.state_since"];

/// Index of the active boss phase (0 = first phase).
pub const BOSS_PHASE: BbKey<f32> = BbKey::new("boss.phase");

pub const BOSS_KEYS: &[&str] = &["boss.phase"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_lists_match_key_names() {
        for name in [
            SELF_POSITION.name(),
            SELF_HEALTH.name(),
            PLAYER.name(),
            PLAYER_VISIBLE.name(),
            PLAYER_HEARD.name(),
            PLAYER_VISIBLE_FOR.name(),
            PLAYER_NOTICED.name(),
            PLAYER_POSITION.name(),
            PLAYER_DISTANCE.name(),
            PLAYER_LAST_KNOWN.name(),
            PLAYER_LAST_SEEN_AT.name(),
        ] {
            assert!(PERCEPTION_KEYS.contains(&name), "{name}");
        }
        for name in [
            TUNING_REACTION_DELAY.name(),
            TUNING_DAMAGE_MULTIPLIER.name(),
            TUNING_PATTERN_COMPLEXITY.name(),
            TUNING_LEVEL.name(),
        ] {
            assert!(TUNING_KEYS.contains(&name), "{name}");
        }
        assert!(CONTROLLER_KEYS.contains(&AI_STATE.name()));
        assert!(BOSS_KEYS.contains(&BOSS_PHASE.name()));
    }
}
