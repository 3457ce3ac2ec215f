mod common;

use ai_agent::{tick_agents, AiController, AiState, Controller, TransitionTable};
use ai_bt::TreeBuilder;
use ai_core::keys::PLAYER_POSITION;
use ai_core::{Command, TickContext};
use ai_nav::{MoveToAction, Vec2};
use common::Arena;

fn chaser(id: u64) -> AiController<Arena> {
    let tree = TreeBuilder::<Arena>::new("chase")
        .action("move", MoveToAction::to_key(PLAYER_POSITION, 2.0, 0.5))
        .build()
        .unwrap();
    AiController::single(id, tree, AiState::Chase, TransitionTable::new())
}

fn arena() -> Arena {
    Arena::new(Some(Vec2::new(10.0, 0.0)))
        .with_agent(1, Vec2::new(0.0, 0.0))
        .with_agent(2, Vec2::new(5.0, 0.0))
}

fn run(order: [u64; 2], ticks: u64) -> (Arena, Vec<(u64, Command)>) {
    let mut world = arena();
    let mut controllers: Vec<Box<dyn Controller<Arena>>> = order
        .iter()
        .map(|&id| Box::new(chaser(id)) as Box<dyn Controller<Arena>>)
        .collect();
    let mut all = Vec::new();
    let mut ctx = TickContext::new(0, 0.5, 3);
    for _ in 0..ticks {
        let mut sink: Vec<(u64, Command)> = Vec::new();
        tick_agents(&ctx, &world, &mut controllers, &mut sink);
        world.apply(&sink, ctx.dt());
        all.extend(sink);
        ctx = ctx.next();
    }
    (world, all)
}

#[test]
fn commands_are_forwarded_in_agent_order() {
    let (_, commands) = run([2, 1], 1);
    let agents: Vec<u64> = commands.iter().map(|(agent, _)| *agent).collect();
    assert_eq!(agents, [1, 2]);
    assert!(commands
        .iter()
        .all(|(_, c)| matches!(c, Command::MoveTo { speed, .. } if *speed == 2.0)));
}

#[test]
fn slice_order_does_not_change_the_outcome() {
    let (world_a, commands_a) = run([1, 2], 6);
    let (world_b, commands_b) = run([2, 1], 6);
    assert_eq!(commands_a, commands_b);
    assert_eq!(world_a.agents, world_b.agents);
}

#[test]
fn buffers_are_empty_after_forwarding() {
    let world = arena();
    let mut controllers = vec![chaser(1), chaser(2)];
    let mut sink: Vec<(u64, Command)> = Vec::new();
    tick_agents(&TickContext::new(0, 0.1, 0), &world, &mut controllers, &mut sink);

    assert_eq!(sink.len(), 2);
    assert!(controllers.iter().all(|c| c.commands().is_empty()));
}

#[test]
fn agents_observe_the_snapshot_not_each_others_moves() {
    let world = arena();
    let mut controllers = vec![chaser(1), chaser(2)];
    let mut sink: Vec<(u64, Command)> = Vec::new();
    tick_agents(&TickContext::new(0, 0.1, 0), &world, &mut controllers, &mut sink);

    // Nothing was applied yet: both agents still read their starting spot.
    for controller in &controllers {
        let seen = controller
            .blackboard()
            .get(ai_core::keys::SELF_POSITION)
            .unwrap();
        assert_eq!(Some(seen), world.agents.get(&controller.agent()).copied());
    }
}
