use core::fmt;

use ai_core::Handle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coarse behavior mode of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AiState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Retreat,
    Search,
}

impl AiState {
    pub const ALL: [AiState; 6] = [
        AiState::Idle,
        AiState::Patrol,
        AiState::Chase,
        AiState::Attack,
        AiState::Retreat,
        AiState::Search,
    ];

    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Blackboard representation (see [`ai_core::keys::AI_STATE`]).
    pub fn handle(self) -> Handle {
        Handle(self.code())
    }

    pub fn from_handle(handle: Handle) -> Option<Self> {
        Self::from_code(handle.0)
    }

    pub fn name(self) -> &'static str {
        match self {
            AiState::Idle => "idle",
            AiState::Patrol => "patrol",
            AiState::Chase => "chase",
            AiState::Attack => "attack",
            AiState::Retreat => "retreat",
            AiState::Search => "search",
        }
    }
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::AiState;

    #[test]
    fn codes_roundtrip_through_handles() {
        for state in AiState::ALL {
            assert_eq!(AiState::from_handle(state.handle()), Some(state));
        }
        assert_eq!(AiState::from_code(6), None);
    }
}
