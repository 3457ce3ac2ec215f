use std::sync::Arc;

use crate::config::PatternConfig;

/// Runtime form of a [`PatternConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: Arc<str>,
    pub cooldown: f32,
    pub weight: f32,
    pub telegraph: f32,
    pub active: f32,
    pub damage: f32,
    pub complexity: f32,
    pub max_range: Option<f32>,
}

impl From<&PatternConfig> for Pattern {
    fn from(config: &PatternConfig) -> Self {
        Self {
            id: Arc::from(config.id.as_str()),
            cooldown: config.cooldown,
            weight: config.weight,
            telegraph: config.telegraph,
            active: config.active,
            damage: config.damage,
            complexity: config.complexity,
            max_range: config.max_range,
        }
    }
}

impl Pattern {
    /// Selection weight after difficulty scaling: complex patterns lose
    /// weight as `tuning` (pattern complexity, `[0, 1]`) drops.
    pub fn effective_weight(&self, tuning: f32) -> f32 {
        let tuning = tuning.clamp(0.0, 1.0);
        self.weight * (1.0 - self.complexity * (1.0 - tuning))
    }

    pub fn in_range(&self, distance: Option<f32>) -> bool {
        match self.max_range {
            None => true,
            Some(range) => distance.is_some_and(|d| d <= range),
        }
    }
}

/// The declared patterns plus one cooldown slot per pattern.
///
/// Both vectors are sized once at load; indices are declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTable {
    patterns: Vec<Pattern>,
    remaining: Vec<f32>,
}

impl PatternTable {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        let remaining = vec![0.0; patterns.len()];
        Self {
            patterns,
            remaining,
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.patterns.iter().position(|p| &*p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Seconds until the pattern at `index` is usable again.
    pub fn remaining(&self, index: usize) -> f32 {
        self.remaining.get(index).copied().unwrap_or(0.0)
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.remaining(index) <= 0.0
    }

    /// Count every cooldown down by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for left in &mut self.remaining {
            *left = (*left - dt).max(0.0);
        }
    }

    /// Mark the pattern as used: its cooldown restarts at the configured value.
    pub fn trigger(&mut self, index: usize) -> Option<&Pattern> {
        let pattern = self.patterns.get(index)?;
        self.remaining[index] = pattern.cooldown;
        Some(pattern)
    }

    pub fn clear_cooldowns(&mut self) {
        self.remaining.fill(0.0);
    }

    /// Highest effective weight among `candidates` that are ready and in
    /// range. Equal weights go to the earlier declaration; patterns whose
    /// effective weight dropped to zero are skipped.
    pub fn select(&self, candidates: &[usize], tuning: f32, distance: Option<f32>) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for &index in candidates {
            let Some(pattern) = self.patterns.get(index) else {
                continue;
            };
            if !self.is_ready(index) || !pattern.in_range(distance) {
                continue;
            }
            let weight = pattern.effective_weight(tuning);
            if weight <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((index, weight));
            }
        }
        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(id: &str, weight: f32, complexity: f32) -> Pattern {
        Pattern::from(
            &PatternConfig::new(id, 2.0, 0.5)
                .weight(weight)
                .complexity(complexity),
        )
    }

    #[test]
    fn complexity_scales_weight_down() {
        let p = pattern("combo", 2.0, 1.0);
        assert_eq!(p.effective_weight(1.0), 2.0);
        assert_eq!(p.effective_weight(0.5), 1.0);
        assert_eq!(p.effective_weight(0.0), 0.0);
    }

    #[test]
    fn cooldowns_never_go_negative() {
        let mut table = PatternTable::new(vec![pattern("a", 1.0, 0.0)]);
        table.trigger(0);
        table.advance(5.0);
        assert_eq!(table.remaining(0), 0.0);
    }
}
