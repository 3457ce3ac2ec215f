//! Host-side combat: applies agent commands to the world and plays the
//! scripted player, turning both into [`CombatEvent`]s for the director.

use ai_core::{Command, DeterministicRng, SplitMix64};
use ai_difficulty::CombatEvent;
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::world::SimWorld;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub shots: u32,
    pub hits: u32,
    pub attacks_received: u32,
    pub dodges: u32,
    pub parries: u32,
    pub player_deaths: u32,
    pub agents_downed: u32,
    pub combats: u32,
}

#[derive(Debug, Clone)]
pub struct Referee {
    player: PlayerConfig,
    rng: SplitMix64,
    waypoint: usize,
    reload: f32,
    combat: Option<f32>,
    tally: Tally,
}

impl Referee {
    pub fn new(player: PlayerConfig, seed: u64) -> Self {
        Self {
            player,
            rng: SplitMix64::new(seed),
            waypoint: 0,
            reload: 0.0,
            combat: None,
            tally: Tally::default(),
        }
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    /// Apply one tick of agent commands.
    pub fn resolve(
        &mut self,
        world: &mut SimWorld,
        commands: &[(u64, Command)],
        dt: f32,
        events: &mut Vec<CombatEvent>,
    ) {
        for (agent, command) in commands {
            match command {
                Command::MoveTo { target, speed } => world.step_agent(*agent, *target, speed * dt),
                Command::Stop => {}
                Command::PlayTelegraph { pattern, seconds } => {
                    debug!(agent, pattern = %pattern, seconds, "telegraph");
                }
                Command::PlayAttack { pattern, damage } => {
                    debug!(agent, pattern = %pattern, damage, "attack");
                    self.receive_attack(world, *damage, events);
                }
                Command::Interrupt { pattern } => {
                    debug!(agent, pattern = %pattern, "interrupted");
                }
            }
        }
    }

    /// The player either dodges, parries, or takes the hit.
    fn receive_attack(&mut self, world: &mut SimWorld, damage: f32, events: &mut Vec<CombatEvent>) {
        if world.player.health <= 0.0 {
            return;
        }
        self.tally.attacks_received += 1;

        let dodged = self.rng.chance(self.player.dodge);
        events.push(CombatEvent::Dodge { success: dodged });
        if dodged {
            self.tally.dodges += 1;
            return;
        }
        let parried = self.rng.chance(self.player.parry);
        events.push(CombatEvent::Parry { success: parried });
        if parried {
            self.tally.parries += 1;
            return;
        }

        world.player.health -= damage;
        if world.player.health <= 0.0 {
            self.tally.player_deaths += 1;
            events.push(CombatEvent::PlayerDied);
            info!(deaths = self.tally.player_deaths, "player died, respawning");
            self.end_combat(events);
            world.player.health = world.player.max_health;
            world.player.position = world.player.home;
            self.waypoint = 0;
        }
    }

    /// Move the player along its route and shoot at the closest agent it can see.
    pub fn player_turn(&mut self, world: &mut SimWorld, dt: f32, events: &mut Vec<CombatEvent>) {
        let route = &self.player.route;
        if let Some(goal) = route.get(self.waypoint % route.len().max(1)).copied() {
            let at = world.player.position.move_towards(goal, self.player.speed * dt);
            world.player.position = at;
            if at.distance(goal) <= f32::EPSILON {
                self.waypoint = (self.waypoint + 1) % route.len();
            }
        }
        world.noise = self.player.noise;

        let player = world.player.position;
        let target = world
            .agents()
            .filter(|(_, body)| body.health > 0.0)
            .map(|(id, body)| (id, body.position.distance(player)))
            .filter(|(_, d)| *d <= self.player.attack_range)
            .filter(|(id, _)| {
                world
                    .agent(*id)
                    .is_some_and(|b| world.line_of_sight(b.position, player))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        match (target, self.combat) {
            (Some(_), None) => {
                self.combat = Some(0.0);
                self.tally.combats += 1;
            }
            (Some(_), Some(seconds)) => self.combat = Some(seconds + dt),
            (None, Some(_)) => self.end_combat(events),
            (None, None) => {}
        }

        self.reload = (self.reload - dt).max(0.0);
        let Some(target) = target else {
            return;
        };
        if self.reload > 0.0 {
            return;
        }
        self.reload = self.player.attack_interval;

        let hit = self.rng.chance(self.player.accuracy);
        self.tally.shots += 1;
        events.push(CombatEvent::Shot { hit });
        if !hit {
            return;
        }
        self.tally.hits += 1;
        let damage = self.player.damage;
        if let Some(body) = world.agent_mut(target) {
            body.health -= damage;
            if body.health <= 0.0 {
                info!(agent = target, "agent downed, respawning at home");
                body.health = body.max_health;
                body.position = body.home;
                self.tally.agents_downed += 1;
            }
        }
    }

    fn end_combat(&mut self, events: &mut Vec<CombatEvent>) {
        if let Some(seconds) = self.combat.take() {
            events.push(CombatEvent::CombatEnded { seconds });
        }
    }
}
