use ai_core::ActionStatus;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BtStatus::Running)
    }

    /// Stable small integer used in trace events.
    pub fn code(self) -> u64 {
        match self {
            BtStatus::Success => 0,
            BtStatus::Failure => 1,
            BtStatus::Running => 2,
        }
    }

    pub fn invert(self) -> Self {
        match self {
            BtStatus::Success => BtStatus::Failure,
            BtStatus::Failure => BtStatus::Success,
            BtStatus::Running => BtStatus::Running,
        }
    }
}

impl From<ActionStatus> for BtStatus {
    fn from(status: ActionStatus) -> Self {
        match status {
            ActionStatus::Running => BtStatus::Running,
            ActionStatus::Success => BtStatus::Success,
            ActionStatus::Failure => BtStatus::Failure,
        }
    }
}

impl From<bool> for BtStatus {
    fn from(value: bool) -> Self {
        if value {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

/// Index of a node in its tree's arena. Ids are assigned in declaration
/// (depth-first, left-to-right) order; the root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
