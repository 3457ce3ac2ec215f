use std::collections::BTreeMap;

use ai_agent::SenseWorldView;
use ai_core::{Handle, WorldView};
use ai_nav::{NavGrid, NavWorldView, Navigator, Vec2};

/// The one target every agent reacts to.
pub const PLAYER: Handle = Handle(0);

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub home: Vec2,
    pub health: f32,
    pub max_health: f32,
}

impl Body {
    pub fn new(position: Vec2, max_health: f32) -> Self {
        Self {
            position,
            home: position,
            health: max_health,
            max_health,
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Grid arena snapshot: agents see the player within `sight` when no wall
/// cell lies between them, and hear it within `hearing * noise`.
#[derive(Debug, Clone)]
pub struct SimWorld {
    grid: NavGrid,
    sight: f32,
    hearing: f32,
    agents: BTreeMap<u64, Body>,
    pub player: Body,
    pub noise: f32,
}

impl SimWorld {
    pub fn new(grid: NavGrid, sight: f32, hearing: f32, player: Body) -> Self {
        Self {
            grid,
            sight,
            hearing,
            agents: BTreeMap::new(),
            player,
            noise: 0.0,
        }
    }

    pub fn spawn(&mut self, agent: u64, body: Body) {
        self.agents.insert(agent, body);
    }

    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    pub fn agent(&self, agent: u64) -> Option<&Body> {
        self.agents.get(&agent)
    }

    pub fn agent_mut(&mut self, agent: u64) -> Option<&mut Body> {
        self.agents.get_mut(&agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = (u64, &Body)> {
        self.agents.iter().map(|(id, body)| (*id, body))
    }

    /// Step `agent` toward `target`, refusing to enter wall cells.
    pub fn step_agent(&mut self, agent: u64, target: Vec2, max_distance: f32) {
        let Some(from) = self.agents.get(&agent).map(|b| b.position) else {
            return;
        };
        let to = from.move_towards(target, max_distance);
        if self.grid.is_walkable(to) {
            if let Some(body) = self.agents.get_mut(&agent) {
                body.position = to;
            }
        }
    }

    /// No wall cell between `a` and `b`, sampled at quarter-cell steps.
    pub fn line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        let cell = self.grid.cell_size();
        let step = cell * 0.25;
        let length = a.distance(b);
        let samples = (length / step).ceil() as u32;
        (0..=samples).all(|i| {
            let t = if samples == 0 {
                0.0
            } else {
                i as f32 / samples as f32
            };
            let p = a + (b - a) * t;
            !self
                .grid
                .is_blocked((p.x / cell).floor() as i32, (p.y / cell).floor() as i32)
        })
    }

    fn player_distance(&self, observer: u64) -> Option<f32> {
        let at = self.agents.get(&observer)?.position;
        Some(at.distance(self.player.position))
    }
}

impl WorldView for SimWorld {
    type Agent = u64;
}

impl NavWorldView for SimWorld {
    fn position(&self, agent: u64) -> Option<Vec2> {
        self.agents.get(&agent).map(|b| b.position)
    }

    fn navigator(&self) -> &dyn Navigator {
        &self.grid
    }
}

impl SenseWorldView for SimWorld {
    fn player(&self) -> Option<Handle> {
        (self.player.health > 0.0).then_some(PLAYER)
    }

    fn target_position(&self, target: Handle) -> Option<Vec2> {
        (target == PLAYER).then_some(self.player.position)
    }

    fn can_see(&self, observer: u64, target: Handle) -> bool {
        if target != PLAYER {
            return false;
        }
        match self.agents.get(&observer) {
            Some(body) => {
                body.position.distance(self.player.position) <= self.sight
                    && self.line_of_sight(body.position, self.player.position)
            }
            None => false,
        }
    }

    fn can_hear(&self, observer: u64, target: Handle, noise_level: f32) -> bool {
        target == PLAYER
            && noise_level > 0.0
            && self
                .player_distance(observer)
                .is_some_and(|d| d <= self.hearing * noise_level)
    }

    fn noise_level(&self, target: Handle) -> f32 {
        if target == PLAYER {
            self.noise
        } else {
            0.0
        }
    }

    fn health_fraction(&self, agent: u64) -> Option<f32> {
        self.agents.get(&agent).map(Body::fraction)
    }
}
