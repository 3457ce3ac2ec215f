mod common;

use ai_agent::refresh_perception;
use ai_core::keys::{
    PLAYER, PLAYER_DISTANCE, PLAYER_HEARD, PLAYER_LAST_KNOWN, PLAYER_LAST_SEEN_AT, PLAYER_NOTICED,
    PLAYER_POSITION, PLAYER_VISIBLE, PLAYER_VISIBLE_FOR, SELF_HEALTH, SELF_POSITION,
    TUNING_REACTION_DELAY,
};
use ai_core::{Blackboard, TickContext, Timestamp};
use ai_nav::Vec2;
use common::Arena;

fn refresh(world: &Arena, bb: &mut Blackboard, tick: u64) {
    let ctx = TickContext::new(tick, 0.25, 1);
    bb.begin_tick(tick);
    refresh_perception(&ctx, 1, world, bb).unwrap();
}

#[test]
fn visible_player_fills_current_and_memory_keys() {
    let world = Arena::new(Some(Vec2::new(3.0, 4.0))).with_agent(1, Vec2::ZERO);
    let mut bb = Blackboard::new();
    refresh(&world, &mut bb, 0);

    assert_eq!(bb.get(SELF_POSITION), Some(Vec2::ZERO));
    assert_eq!(bb.get(SELF_HEALTH), Some(1.0));
    assert_eq!(bb.get(PLAYER), Some(common::PLAYER));
    assert_eq!(bb.get(PLAYER_VISIBLE), Some(true));
    assert_eq!(bb.get(PLAYER_HEARD), Some(false));
    assert_eq!(bb.get(PLAYER_POSITION), Some(Vec2::new(3.0, 4.0)));
    assert_eq!(bb.get(PLAYER_DISTANCE), Some(5.0));
    assert_eq!(bb.get(PLAYER_LAST_KNOWN), Some(Vec2::new(3.0, 4.0)));
    assert_eq!(bb.get(PLAYER_LAST_SEEN_AT), Some(Timestamp(0)));
}

#[test]
fn losing_sight_removes_current_keys_but_keeps_memory() {
    let mut world = Arena::new(Some(Vec2::new(3.0, 4.0))).with_agent(1, Vec2::ZERO);
    let mut bb = Blackboard::new();
    refresh(&world, &mut bb, 0);
    refresh(&world, &mut bb, 1);

    world.player = Some(Vec2::new(30.0, 40.0));
    refresh(&world, &mut bb, 2);

    assert_eq!(bb.get(PLAYER_VISIBLE), Some(false));
    assert_eq!(bb.get(PLAYER_VISIBLE_FOR), Some(0.0));
    assert!(!bb.contains(PLAYER_POSITION.name()));
    assert!(!bb.contains(PLAYER_DISTANCE.name()));
    assert_eq!(bb.get(PLAYER_LAST_KNOWN), Some(Vec2::new(3.0, 4.0)));
    assert_eq!(bb.get(PLAYER_LAST_SEEN_AT), Some(Timestamp(1)));
}

#[test]
fn hearing_reports_position_without_sight() {
    let mut world = Arena::new(Some(Vec2::new(15.0, 0.0))).with_agent(1, Vec2::ZERO);
    world.noise = 1.0;
    let mut bb = Blackboard::new();
    refresh(&world, &mut bb, 3);

    assert_eq!(bb.get(PLAYER_VISIBLE), Some(false));
    assert_eq!(bb.get(PLAYER_HEARD), Some(true));
    assert_eq!(bb.get(PLAYER_DISTANCE), Some(15.0));
    assert_eq!(bb.get(PLAYER_LAST_SEEN_AT), Some(Timestamp(3)));
}

#[test]
fn noticed_waits_for_reaction_delay() {
    let world = Arena::new(Some(Vec2::new(1.0, 0.0))).with_agent(1, Vec2::ZERO);
    let mut bb = Blackboard::new();
    bb.set(TUNING_REACTION_DELAY, 0.5);

    refresh(&world, &mut bb, 0);
    assert_eq!(bb.get(PLAYER_VISIBLE_FOR), Some(0.25));
    assert_eq!(bb.get(PLAYER_NOTICED), Some(false));

    refresh(&world, &mut bb, 1);
    assert_eq!(bb.get(PLAYER_VISIBLE_FOR), Some(0.5));
    assert_eq!(bb.get(PLAYER_NOTICED), Some(true));
}

#[test]
fn lower_reaction_delay_notices_sooner() {
    let world = Arena::new(Some(Vec2::new(1.0, 0.0))).with_agent(1, Vec2::ZERO);
    let mut bb = Blackboard::new();
    bb.set(TUNING_REACTION_DELAY, 0.25);

    refresh(&world, &mut bb, 0);
    assert_eq!(bb.get(PLAYER_NOTICED), Some(true));
}

#[test]
fn no_player_clears_player_keys() {
    let mut world = Arena::new(Some(Vec2::new(1.0, 0.0))).with_agent(1, Vec2::ZERO);
    let mut bb = Blackboard::new();
    refresh(&world, &mut bb, 0);

    world.player = None;
    refresh(&world, &mut bb, 1);

    assert_eq!(bb.get(PLAYER), None);
    assert_eq!(bb.get(PLAYER_VISIBLE), Some(false));
    assert_eq!(bb.get(PLAYER_NOTICED), Some(false));
    assert!(!bb.contains(PLAYER_POSITION.name()));
    assert_eq!(bb.get(PLAYER_LAST_KNOWN), Some(Vec2::new(1.0, 0.0)));
}

#[test]
fn refresh_stamps_entries_with_the_current_tick() {
    let world = Arena::new(None).with_agent(1, Vec2::new(2.0, 2.0));
    let mut bb = Blackboard::new();
    refresh(&world, &mut bb, 9);
    assert_eq!(bb.written_at(SELF_POSITION.name()), Some(9));
    assert!(bb.require_fresh(SELF_POSITION, 0).is_ok());
}
