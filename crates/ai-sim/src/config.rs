//! Encounter files: the arena, the scripted player, guards and an optional boss.

use std::collections::BTreeMap;
use std::path::Path;

use ai_agent::{AiState, TransitionSpec};
use ai_boss::BossConfig;
use ai_bt::TreeSpec;
use ai_core::Vec2;
use ai_difficulty::DifficultyConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Encounter shipped with the binary; used when no `--config` is given.
pub const DEMO_ENCOUNTER: &str = include_str!("../demos/encounter.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterConfig {
    pub name: String,
    pub arena: ArenaConfig,
    pub player: PlayerConfig,
    #[serde(default)]
    pub guards: Vec<GuardConfig>,
    #[serde(default)]
    pub boss: Option<BossSetup>,
    #[serde(default)]
    pub difficulty: DifficultyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// `.` walkable, `#` wall; the first row is `y = 0`.
    pub rows: Vec<String>,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// How far agents see, in world units.
    #[serde(default = "default_sight")]
    pub sight: f32,
    /// How far a player at noise level 1.0 is heard.
    #[serde(default = "default_hearing")]
    pub hearing: f32,
}

/// Scripted opponent. Walks `route` in a loop and fights whatever is close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub route: Vec<Vec2>,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default)]
    pub noise: f32,
    pub accuracy: f32,
    pub dodge: f32,
    pub parry: f32,
    /// Damage per hit on an agent.
    pub damage: f32,
    pub attack_range: f32,
    /// Seconds between shots.
    pub attack_interval: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub id: u64,
    pub spawn: Vec2,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default = "default_guard_speed")]
    pub speed: f32,
    #[serde(default)]
    pub patrol: Vec<Vec2>,
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    #[serde(default = "default_strike_damage")]
    pub strike_damage: f32,
    #[serde(default = "default_strike_cooldown")]
    pub strike_cooldown: f32,
    /// Seconds one `chase` run may last before it fails.
    #[serde(default)]
    pub chase_limit: Option<f32>,
    #[serde(default = "default_initial")]
    pub initial: AiState,
    /// One tree for every state.
    #[serde(default)]
    pub tree: Option<TreeSpec>,
    /// One tree per state; used when `tree` is absent.
    #[serde(default)]
    pub trees: BTreeMap<AiState, TreeSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossSetup {
    pub id: u64,
    pub spawn: Vec2,
    #[serde(default = "default_health")]
    pub health: f32,
    #[serde(default)]
    pub reposition: RepositionConfig,
    pub config: BossConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositionConfig {
    pub distance: f32,
    pub speed: f32,
    pub arrival: f32,
}

impl Default for RepositionConfig {
    fn default() -> Self {
        Self {
            distance: 4.0,
            speed: 3.0,
            arrival: 0.25,
        }
    }
}

fn default_cell_size() -> f32 {
    1.0
}

fn default_sight() -> f32 {
    8.0
}

fn default_hearing() -> f32 {
    12.0
}

fn default_player_speed() -> f32 {
    2.0
}

fn default_health() -> f32 {
    100.0
}

fn default_guard_speed() -> f32 {
    2.5
}

fn default_attack_range() -> f32 {
    1.5
}

fn default_strike_damage() -> f32 {
    8.0
}

fn default_strike_cooldown() -> f32 {
    1.0
}

fn default_initial() -> AiState {
    AiState::Patrol
}

impl EncounterConfig {
    /// Load and validate an encounter from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read encounter from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid encounter in {}", path.display()))
    }

    pub fn demo() -> Result<Self> {
        Self::from_yaml(DEMO_ENCOUNTER).context("Built-in demo encounter is invalid")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse encounter")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that only need the file itself; trees and transitions are
    /// checked again when the simulation instantiates them.
    pub fn validate(&self) -> Result<()> {
        if self.player.route.is_empty() {
            bail!("player route must have at least one point");
        }
        for (name, p) in [
            ("accuracy", self.player.accuracy),
            ("dodge", self.player.dodge),
            ("parry", self.player.parry),
        ] {
            if !(0.0..=1.0).contains(&p) {
                bail!("player {name} is {p}, expected a probability in [0, 1]");
            }
        }
        if !(self.player.attack_interval.is_finite() && self.player.attack_interval > 0.0) {
            bail!("player attack_interval must be positive");
        }
        if self.guards.is_empty() && self.boss.is_none() {
            bail!("encounter `{}` has no agents", self.name);
        }

        let mut ids = Vec::new();
        for guard in &self.guards {
            if guard.tree.is_none() && guard.trees.is_empty() {
                bail!("guard {} has neither `tree` nor `trees`", guard.id);
            }
            if let Some(limit) = guard.chase_limit {
                if !(limit.is_finite() && limit > 0.0) {
                    bail!("guard {} chase_limit must be positive, got {limit}", guard.id);
                }
            }
            ids.push(guard.id);
        }
        if let Some(boss) = &self.boss {
            boss.config
                .validate()
                .with_context(|| format!("boss {}", boss.id))?;
            ids.push(boss.id);
        }
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            bail!("agent id {} is used twice", pair[0]);
        }

        self.difficulty
            .validate()
            .context("difficulty configuration")?;
        Ok(())
    }
}
