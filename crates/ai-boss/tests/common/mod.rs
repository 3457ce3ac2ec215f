#![allow(dead_code)]

use ai_agent::SenseWorldView;
use ai_boss::{BossConfig, PatternConfig, PhaseConfig};
use ai_core::{Handle, WorldView};
use ai_nav::{NavWorldView, Navigator, OpenField, Vec2};

pub const BOSS: u64 = 1;
pub const PLAYER: Handle = Handle(100);

/// One boss and a player that is always visible.
pub struct Arena {
    pub boss: Vec2,
    pub player: Vec2,
    pub health: f32,
    nav: OpenField,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            boss: Vec2::ZERO,
            player: Vec2::new(2.0, 0.0),
            health: 1.0,
            nav: OpenField,
        }
    }
}

impl WorldView for Arena {
    type Agent = u64;
}

impl NavWorldView for Arena {
    fn position(&self, agent: u64) -> Option<Vec2> {
        (agent == BOSS).then_some(self.boss)
    }

    fn navigator(&self) -> &dyn Navigator {
        &self.nav
    }
}

impl SenseWorldView for Arena {
    fn player(&self) -> Option<Handle> {
        Some(PLAYER)
    }

    fn target_position(&self, _target: Handle) -> Option<Vec2> {
        Some(self.player)
    }

    fn can_see(&self, _observer: u64, _target: Handle) -> bool {
        true
    }

    fn can_hear(&self, _observer: u64, _target: Handle, _noise_level: f32) -> bool {
        false
    }

    fn health_fraction(&self, agent: u64) -> Option<f32> {
        (agent == BOSS).then_some(self.health)
    }
}

/// Three phases: `opening` (slam, sweep), `enraged` (adds barrage, clears
/// cooldowns on entry) and `desperate` (barrage only).
pub fn warden() -> BossConfig {
    BossConfig {
        name: "warden".into(),
        patterns: vec![
            PatternConfig::new("slam", 2.0, 0.5)
                .weight(3.0)
                .active(0.5)
                .damage(10.0),
            PatternConfig::new("sweep", 1.0, 0.25)
                .weight(3.0)
                .damage(5.0),
            PatternConfig::new("barrage", 4.0, 1.0)
                .weight(5.0)
                .active(1.0)
                .damage(20.0)
                .complexity(1.0),
        ],
        phases: vec![
            PhaseConfig::new("enraged", 0.5, ["slam", "sweep", "barrage"]).clear_cooldowns(true),
            PhaseConfig::new("opening", 1.0, ["slam", "sweep"]),
            PhaseConfig::new("desperate", 0.2, ["barrage"]),
        ],
        reversible_phases: false,
    }
}
