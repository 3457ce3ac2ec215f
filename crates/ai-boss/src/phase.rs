/// Which health bracket is active.
///
/// Thresholds are stored in descending order; health at or below a
/// threshold selects the deepest such phase, health above every threshold
/// keeps phase 0. Without `reversible`, the index only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseMachine {
    thresholds: Vec<f32>,
    current: usize,
    reversible: bool,
}

impl PhaseMachine {
    /// `thresholds` must already be sorted in descending order.
    pub fn new(thresholds: Vec<f32>, reversible: bool) -> Self {
        debug_assert!(thresholds.windows(2).all(|w| w[0] > w[1]));
        Self {
            thresholds,
            current: 0,
            reversible,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    pub fn threshold(&self, phase: usize) -> Option<f32> {
        self.thresholds.get(phase).copied()
    }

    /// Phase that `health` falls into, ignoring history.
    pub fn phase_for(&self, health: f32) -> usize {
        self.thresholds
            .iter()
            .rposition(|&t| health <= t)
            .unwrap_or(0)
    }

    /// Move to the phase for `health`. Returns `(from, to)` when it changed.
    pub fn update(&mut self, health: f32) -> Option<(usize, usize)> {
        let target = self.phase_for(health);
        if target == self.current || (target < self.current && !self.reversible) {
            return None;
        }
        let from = self.current;
        self.current = target;
        Some((from, target))
    }
}
