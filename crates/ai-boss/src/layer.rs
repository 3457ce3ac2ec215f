use std::sync::Arc;

use ai_core::SlotKey;

use crate::config::{BossConfig, ConfigError};
use crate::pattern::{Pattern, PatternTable};
use crate::phase::PhaseMachine;

/// Blackboard attachment holding the boss's [`PatternLayer`].
pub const BOSS_LAYER: SlotKey<PatternLayer> = SlotKey::new(0xB055_1A7E_0000_0001);

#[derive(Debug, Clone, PartialEq)]
struct Phase {
    name: Arc<str>,
    /// Pattern indices in declaration order.
    enabled: Vec<usize>,
    clear_cooldowns: bool,
}

/// A phase switch, as reported by [`PatternLayer::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseChange {
    pub from: usize,
    pub to: usize,
    pub from_name: Arc<str>,
    pub to_name: Arc<str>,
    /// Health fraction that caused the switch.
    pub health: f32,
}

/// Phase machine plus cooldown table for one boss.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternLayer {
    name: Arc<str>,
    phases: Vec<Phase>,
    machine: PhaseMachine,
    table: PatternTable,
}

impl PatternLayer {
    /// Validate `config` and size every table for it.
    pub fn new(config: &BossConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let table = PatternTable::new(config.patterns.iter().map(Pattern::from).collect());

        let mut phases: Vec<_> = config.phases.iter().collect();
        phases.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        let machine = PhaseMachine::new(
            phases.iter().map(|p| p.threshold).collect(),
            config.reversible_phases,
        );
        let phases = phases
            .into_iter()
            .map(|p| {
                let mut enabled: Vec<usize> = p
                    .patterns
                    .iter()
                    .filter_map(|id| table.index_of(id))
                    .collect();
                enabled.sort_unstable();
                enabled.dedup();
                Phase {
                    name: Arc::from(p.name.as_str()),
                    enabled,
                    clear_cooldowns: p.clear_cooldowns,
                }
            })
            .collect();

        Ok(Self {
            name: Arc::from(config.name.as_str()),
            phases,
            machine,
            table,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> usize {
        self.machine.current()
    }

    pub fn phase_name(&self) -> &str {
        self.phases
            .get(self.machine.current())
            .map_or("", |p| &*p.name)
    }

    /// Position of the phase called `name`, in threshold order.
    pub fn phase_index(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| &*p.name == name)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.table.get(index)
    }

    /// Pattern indices enabled in the active phase.
    pub fn enabled(&self) -> &[usize] {
        self.phases
            .get(self.machine.current())
            .map_or(&[][..], |p| p.enabled.as_slice())
    }

    /// Once per tick: count cooldowns down and follow `health` into a new
    /// phase. The enabled set follows the phase immediately; built-in entry
    /// effects wait for [`enter`](Self::enter).
    pub fn advance(&mut self, dt: f32, health: f32) -> Option<PhaseChange> {
        self.table.advance(dt);
        let (from, to) = self.machine.update(health)?;
        Some(PhaseChange {
            from,
            to,
            from_name: self.phases[from].name.clone(),
            to_name: self.phases[to].name.clone(),
            health,
        })
    }

    /// Built-in entry effects of the phase `change` switched into.
    pub fn enter(&mut self, change: &PhaseChange) {
        if self.phases.get(change.to).is_some_and(|p| p.clear_cooldowns) {
            self.table.clear_cooldowns();
        }
    }

    /// Best pattern for the active phase, if any is usable right now.
    pub fn select(&self, tuning: f32, distance: Option<f32>) -> Option<usize> {
        self.table.select(self.enabled(), tuning, distance)
    }

    /// Start the cooldown of the pattern at `index` and return it.
    pub fn trigger(&mut self, index: usize) -> Option<&Pattern> {
        self.table.trigger(index)
    }
}
