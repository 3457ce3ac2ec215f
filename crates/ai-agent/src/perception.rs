//! Perception collaborator and the blackboard refresh it feeds.

use ai_core::keys::{
    PERCEPTION_KEYS, PLAYER, PLAYER_DISTANCE, PLAYER_HEARD, PLAYER_LAST_KNOWN, PLAYER_LAST_SEEN_AT,
    PLAYER_NOTICED, PLAYER_POSITION, PLAYER_VISIBLE, PLAYER_VISIBLE_FOR, SELF_HEALTH,
    SELF_POSITION, TUNING_REACTION_DELAY,
};
use ai_core::{Blackboard, BlackboardError, Handle, TickContext, Timestamp, Vec2};
use ai_nav::NavWorldView;

/// Reaction delay used until a difficulty director writes `tuning.reaction_delay`.
pub const DEFAULT_REACTION_DELAY: f32 = 0.3;

/// Perception queries, answered from the world snapshot of the current tick.
///
/// Results are treated as valid for this tick only.
pub trait SenseWorldView: NavWorldView {
    /// The target agents react to, if one exists.
    fn player(&self) -> Option<Handle>;

    fn target_position(&self, target: Handle) -> Option<Vec2>;

    fn can_see(&self, observer: Self::Agent, target: Handle) -> bool;

    fn can_hear(&self, observer: Self::Agent, target: Handle, noise_level: f32) -> bool;

    /// How much noise `target` makes this tick, `[0, 1]`.
    fn noise_level(&self, _target: Handle) -> f32 {
        0.0
    }

    /// Remaining health as a fraction of maximum.
    fn health_fraction(&self, agent: Self::Agent) -> Option<f32>;
}

/// Rewrite the perception keys for `agent` from the world snapshot.
///
/// Writes go through a scoped writer limited to
/// [`PERCEPTION_KEYS`](ai_core::keys::PERCEPTION_KEYS). `player.position` and
/// `player.distance` only exist on ticks where the player is seen or heard;
/// `player.last_known` and `player.last_seen_at` keep the most recent sighting.
pub fn refresh_perception<W>(
    ctx: &TickContext,
    agent: W::Agent,
    world: &W,
    blackboard: &mut Blackboard,
) -> Result<(), BlackboardError>
where
    W: SenseWorldView,
{
    let reaction_delay = blackboard
        .get(TUNING_REACTION_DELAY)
        .unwrap_or(DEFAULT_REACTION_DELAY);
    let was_visible = blackboard.get(PLAYER_VISIBLE).unwrap_or(false);
    let visible_for = blackboard.get(PLAYER_VISIBLE_FOR).unwrap_or(0.0);

    let mut writer = blackboard.grant("perception", PERCEPTION_KEYS);

    let position = world.position(agent);
    match position {
        Some(position) => writer.set(SELF_POSITION, position)?,
        None => {
            writer.remove(SELF_POSITION)?;
        }
    }
    if let Some(health) = world.health_fraction(agent) {
        writer.set(SELF_HEALTH, health.clamp(0.0, 1.0))?;
    }

    let Some(player) = world.player() else {
        writer.remove(PLAYER)?;
        writer.set(PLAYER_VISIBLE, false)?;
        writer.set(PLAYER_HEARD, false)?;
        writer.set(PLAYER_VISIBLE_FOR, 0.0)?;
        writer.set(PLAYER_NOTICED, false)?;
        writer.remove(PLAYER_POSITION)?;
        writer.remove(PLAYER_DISTANCE)?;
        return Ok(());
    };
    writer.set(PLAYER, player)?;

    let visible = world.can_see(agent, player);
    let heard = world.can_hear(agent, player, world.noise_level(player));
    let visible_for = match (visible, was_visible) {
        (true, true) => visible_for + ctx.dt(),
        (true, false) => ctx.dt(),
        (false, _) => 0.0,
    };
    writer.set(PLAYER_VISIBLE, visible)?;
    writer.set(PLAYER_HEARD, heard)?;
    writer.set(PLAYER_VISIBLE_FOR, visible_for)?;
    writer.set(PLAYER_NOTICED, visible && visible_for >= reaction_delay)?;

    let sensed = if visible || heard {
        world.target_position(player)
    } else {
        None
    };
    match sensed {
        Some(target) => {
            writer.set(PLAYER_POSITION, target)?;
            match position {
                Some(position) => writer.set(PLAYER_DISTANCE, position.distance(target))?,
                None => {
                    writer.remove(PLAYER_DISTANCE)?;
                }
            }
            writer.set(PLAYER_LAST_KNOWN, target)?;
            writer.set(PLAYER_LAST_SEEN_AT, Timestamp(ctx.tick))?;
        }
        None => {
            writer.remove(PLAYER_POSITION)?;
            writer.remove(PLAYER_DISTANCE)?;
        }
    }
    Ok(())
}
