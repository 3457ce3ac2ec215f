use std::collections::BTreeMap;

use ai_agent::{tick_agents, AiController, AiState, Controller, TransitionTable};
use ai_boss::{boss_tree, BossController, PatternLayer, RepositionAction};
use ai_core::keys::AI_STATE;
use ai_core::{Command, TickContext};
use ai_difficulty::{CombatEvent, DifficultyDirector, DifficultyLevel};
use ai_nav::NavGrid;
use ai_tools::{TraceSink, TRACE_SINK};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::actions::guard_registry;
use crate::combat::{Referee, Tally};
use crate::config::{BossSetup, EncounterConfig, GuardConfig};
use crate::world::{Body, SimWorld};

/// Seed stream for the referee, kept apart from the agents' streams.
const REFEREE_STREAM: u64 = 0x5EF_E4EE;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub ticks: u64,
    pub tally: Tally,
    pub level: DifficultyLevel,
    pub skill: f32,
    pub level_changes: u32,
    pub states: BTreeMap<u64, AiState>,
}

/// One encounter: the world, every controller, the host referee and the
/// difficulty director, advanced one fixed step at a time.
pub struct Simulation {
    ctx: TickContext,
    world: SimWorld,
    controllers: Vec<Box<dyn Controller<SimWorld>>>,
    referee: Referee,
    director: DifficultyDirector,
    outbox: Vec<(u64, Command)>,
    events: Vec<CombatEvent>,
    level_changes: u32,
}

impl Simulation {
    pub fn new(config: &EncounterConfig, seed: u64, dt: f32) -> Result<Self> {
        config.validate()?;
        let arena = &config.arena;
        let grid = NavGrid::from_rows(&arena.rows, arena.cell_size).context("arena rows")?;

        let start = config.player.route[0];
        let mut world = SimWorld::new(
            grid,
            arena.sight,
            arena.hearing,
            Body::new(start, config.player.health),
        );

        let mut controllers: Vec<Box<dyn Controller<SimWorld>>> = Vec::new();
        for guard in &config.guards {
            world.spawn(guard.id, Body::new(guard.spawn, guard.health));
            controllers.push(Box::new(
                build_guard(guard).with_context(|| format!("guard {}", guard.id))?,
            ));
        }
        if let Some(boss) = &config.boss {
            world.spawn(boss.id, Body::new(boss.spawn, boss.health));
            controllers.push(Box::new(
                build_boss(boss).with_context(|| format!("boss {}", boss.id))?,
            ));
        }

        let director =
            DifficultyDirector::new(config.difficulty.clone()).context("difficulty director")?;
        let ctx = TickContext::new(0, dt, seed);

        let mut sim = Self {
            ctx,
            world,
            controllers,
            referee: Referee::new(config.player.clone(), seed ^ REFEREE_STREAM),
            director,
            outbox: Vec::new(),
            events: Vec::new(),
            level_changes: 0,
        };
        sim.apply_tuning();
        info!(
            encounter = %config.name,
            agents = sim.controllers.len(),
            seed,
            "encounter loaded"
        );
        Ok(sim)
    }

    /// Stream every agent's trace events into sinks made by `make`.
    pub fn trace_with(&mut self, mut make: impl FnMut(u64) -> Box<dyn TraceSink>) {
        for controller in &mut self.controllers {
            let id = controller.id();
            controller.blackboard_mut().attach(TRACE_SINK, make(id));
        }
    }

    pub fn tick(&self) -> u64 {
        self.ctx.tick
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn director(&self) -> &DifficultyDirector {
        &self.director
    }

    pub fn step(&mut self) {
        let dt = self.ctx.dt();
        self.outbox.clear();
        tick_agents(
            &self.ctx,
            &self.world,
            &mut self.controllers,
            &mut self.outbox,
        );

        self.referee
            .resolve(&mut self.world, &self.outbox, dt, &mut self.events);
        self.referee
            .player_turn(&mut self.world, dt, &mut self.events);
        for event in self.events.drain(..) {
            self.director.record(event);
        }

        if let Some(update) = self.director.update(dt) {
            if update.level_changed() {
                self.level_changes += 1;
            }
            self.apply_tuning();
        }
        self.ctx = self.ctx.next();
    }

    pub fn run(&mut self, ticks: u64) -> Report {
        for _ in 0..ticks {
            self.step();
        }
        self.report()
    }

    /// Summary so far; reads each agent's state off its blackboard.
    pub fn report(&mut self) -> Report {
        let states = self
            .controllers
            .iter_mut()
            .filter_map(|c| {
                let id = c.id();
                let state = c
                    .blackboard_mut()
                    .get(AI_STATE)
                    .and_then(AiState::from_handle)?;
                Some((id, state))
            })
            .collect();
        Report {
            ticks: self.ctx.tick,
            tally: self.referee.tally(),
            level: self.director.level(),
            skill: self.director.skill(),
            level_changes: self.level_changes,
            states,
        }
    }

    fn apply_tuning(&mut self) {
        for controller in &mut self.controllers {
            let id = controller.id();
            if let Err(err) = self.director.apply(controller.blackboard_mut()) {
                warn!(agent = id, error = %err, "could not apply difficulty tuning");
            }
        }
    }
}

fn build_guard(guard: &GuardConfig) -> Result<AiController<SimWorld>> {
    let registry = guard_registry(guard);
    let transitions = TransitionTable::from_specs(&guard.transitions);
    if let Some(spec) = &guard.tree {
        let tree = spec.build(&registry)?;
        return Ok(AiController::single(guard.id, tree, guard.initial, transitions));
    }
    let mut trees = BTreeMap::new();
    for (state, spec) in &guard.trees {
        let tree = spec
            .build(&registry)
            .with_context(|| format!("tree for state `{state}`"))?;
        trees.insert(*state, tree);
    }
    Ok(AiController::hybrid(guard.id, trees, guard.initial, transitions)?)
}

fn build_boss(boss: &BossSetup) -> Result<BossController<SimWorld>> {
    let reposition = RepositionAction::new(
        boss.reposition.distance,
        boss.reposition.speed,
        boss.reposition.arrival,
    );
    let tree = boss_tree("boss", reposition)?;
    let layer = PatternLayer::new(&boss.config)?;
    let inner = AiController::single(boss.id, tree, AiState::Attack, TransitionTable::new());
    Ok(BossController::new(inner, layer))
}
