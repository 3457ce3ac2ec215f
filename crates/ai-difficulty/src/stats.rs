#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Something the combat layer observed about the player.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum CombatEvent {
    /// The player attacked.
    Shot { hit: bool },
    /// The player tried to dodge an attack.
    Dodge { success: bool },
    /// The player tried to parry an attack.
    Parry { success: bool },
    /// An encounter finished after `seconds`.
    CombatEnded { seconds: f32 },
    PlayerDied,
}

/// Running totals. Counts are `f32` so history can decay smoothly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CombatStats {
    pub shots: f32,
    pub hits: f32,
    pub dodge_attempts: f32,
    pub dodges: f32,
    pub parry_attempts: f32,
    pub parries: f32,
    pub combats: f32,
    pub combat_seconds: f32,
    pub deaths: f32,
}

fn ratio(part: f32, total: f32) -> Option<f32> {
    (total > 0.0).then(|| (part / total).clamp(0.0, 1.0))
}

impl CombatStats {
    pub fn record(&mut self, event: CombatEvent) {
        match event {
            CombatEvent::Shot { hit } => {
                self.shots += 1.0;
                if hit {
                    self.hits += 1.0;
                }
            }
            CombatEvent::Dodge { success } => {
                self.dodge_attempts += 1.0;
                if success {
                    self.dodges += 1.0;
                }
            }
            CombatEvent::Parry { success } => {
                self.parry_attempts += 1.0;
                if success {
                    self.parries += 1.0;
                }
            }
            CombatEvent::CombatEnded { seconds } => {
                self.combats += 1.0;
                self.combat_seconds += seconds.max(0.0);
            }
            CombatEvent::PlayerDied => self.deaths += 1.0,
        }
    }

    /// `None` until the player has attacked.
    pub fn accuracy(&self) -> Option<f32> {
        ratio(self.hits, self.shots)
    }

    pub fn dodge_rate(&self) -> Option<f32> {
        ratio(self.dodges, self.dodge_attempts)
    }

    pub fn parry_rate(&self) -> Option<f32> {
        ratio(self.parries, self.parry_attempts)
    }

    pub fn average_combat_seconds(&self) -> Option<f32> {
        (self.combats > 0.0).then(|| self.combat_seconds / self.combats)
    }

    /// Scale every total by `retention` (`[0, 1]`); older samples fade out.
    pub fn decay(&mut self, retention: f32) {
        let r = retention.clamp(0.0, 1.0);
        for value in [
            &mut self.shots,
            &mut self.hits,
            &mut self.dodge_attempts,
            &mut self.dodges,
            &mut self.parry_attempts,
            &mut self.parries,
            &mut self.combats,
            &mut self.combat_seconds,
            &mut self.deaths,
        ] {
            *value *= r;
        }
    }
}
