#![allow(dead_code)]

use std::collections::BTreeMap;

use ai_agent::SenseWorldView;
use ai_core::{Command, Handle, WorldView};
use ai_nav::{NavWorldView, Navigator, OpenField, Vec2};

pub const PLAYER: Handle = Handle(100);

/// Flat arena: agents see the player within `sight` and hear it within
/// `hearing * noise`.
pub struct Arena {
    pub agents: BTreeMap<u64, Vec2>,
    pub health: BTreeMap<u64, f32>,
    pub player: Option<Vec2>,
    pub sight: f32,
    pub hearing: f32,
    pub noise: f32,
    nav: OpenField,
}

impl Arena {
    pub fn new(player: Option<Vec2>) -> Self {
        Self {
            agents: BTreeMap::new(),
            health: BTreeMap::new(),
            player,
            sight: 10.0,
            hearing: 20.0,
            noise: 0.0,
            nav: OpenField,
        }
    }

    pub fn with_agent(mut self, id: u64, at: Vec2) -> Self {
        self.agents.insert(id, at);
        self.health.insert(id, 1.0);
        self
    }

    /// Host side: move agents the way their commands asked.
    pub fn apply(&mut self, commands: &[(u64, Command)], dt: f32) {
        for (agent, command) in commands {
            if let Command::MoveTo { target, speed } = command {
                if let Some(pos) = self.agents.get_mut(agent) {
                    *pos = pos.move_towards(*target, speed * dt);
                }
            }
        }
    }

    fn player_distance(&self, observer: u64) -> Option<f32> {
        let player = self.player?;
        let at = self.agents.get(&observer)?;
        Some(at.distance(player))
    }
}

impl WorldView for Arena {
    type Agent = u64;
}

impl NavWorldView for Arena {
    fn position(&self, agent: u64) -> Option<Vec2> {
        self.agents.get(&agent).copied()
    }

    fn navigator(&self) -> &dyn Navigator {
        &self.nav
    }
}

impl SenseWorldView for Arena {
    fn player(&self) -> Option<Handle> {
        self.player.map(|_| PLAYER)
    }

    fn target_position(&self, target: Handle) -> Option<Vec2> {
        (target == PLAYER).then_some(self.player).flatten()
    }

    fn can_see(&self, observer: u64, _target: Handle) -> bool {
        self.player_distance(observer)
            .is_some_and(|d| d <= self.sight)
    }

    fn can_hear(&self, observer: u64, _target: Handle, noise_level: f32) -> bool {
        noise_level > 0.0
            && self
                .player_distance(observer)
                .is_some_and(|d| d <= self.hearing * noise_level)
    }

    fn noise_level(&self, _target: Handle) -> f32 {
        self.noise
    }

    fn health_fraction(&self, agent: u64) -> Option<f32> {
        self.health.get(&agent).copied()
    }
}
