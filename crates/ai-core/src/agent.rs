use core::fmt::Debug;

use crate::Handle;

/// Stable identifier for an agent.
///
/// Deterministic simulation requires:
/// - stable ordering (`Ord`) so the frame driver can visit agents in a fixed order
/// - a stable numeric ID (`stable_id`) for seeding, logs and blackboard handles
pub trait AgentId: Copy + Ord + Eq + Debug + 'static {
    fn stable_id(self) -> u64;

    /// The agent as a blackboard value.
    fn handle(self) -> Handle {
        Handle(self.stable_id())
    }
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl AgentId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}
