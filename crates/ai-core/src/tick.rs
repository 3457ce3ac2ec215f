use crate::{rng, AgentId, SplitMix64};

/// Per-frame input shared by every agent ticked in that frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds,
            seed,
        }
    }

    /// Context for the following frame with the same step and seed.
    pub fn next(&self) -> Self {
        Self {
            tick: self.tick + 1,
            ..*self
        }
    }

    /// Non-negative frame step; hosts occasionally hand in negative deltas on clock resets.
    pub fn dt(&self) -> f32 {
        self.dt_seconds.max(0.0)
    }

    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
