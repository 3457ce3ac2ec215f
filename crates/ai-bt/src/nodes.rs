use std::borrow::Cow;
use std::fmt;

use ai_core::{Action, Blackboard, BlackboardError, TickContext, WorldView};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::{BtStatus, NodeId};

/// A single-tick check against the blackboard/world. Never `Running`, never mutates.
pub trait Condition<W>: 'static
where
    W: WorldView,
{
    fn check(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &Blackboard,
    ) -> Result<bool, BlackboardError>;
}

/// Closure-backed condition.
pub struct ConditionFn<F> {
    f: F,
}

impl<F> ConditionFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<W, F> Condition<W> for ConditionFn<F>
where
    W: WorldView,
    F: FnMut(&TickContext, W::Agent, &W, &Blackboard) -> Result<bool, BlackboardError> + 'static,
{
    fn check(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &Blackboard,
    ) -> Result<bool, BlackboardError> {
        (self.f)(ctx, agent, world, blackboard)
    }
}

/// Decision rule for [`NodeKind::Parallel`].
///
/// `None` thresholds are derived from the child count `M`: success defaults
/// to all children, failure to the first count that makes success impossible
/// (`M - N + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParallelPolicy {
    #[cfg_attr(feature = "serde", serde(default))]
    pub success_threshold: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub failure_threshold: Option<usize>,
}

impl ParallelPolicy {
    pub fn require_all() -> Self {
        Self::default()
    }

    pub fn require(successes: usize) -> Self {
        Self {
            success_threshold: Some(successes),
            failure_threshold: None,
        }
    }

    pub fn fail_on_any(self) -> Self {
        self.fail_after(1)
    }

    pub fn fail_after(mut self, failures: usize) -> Self {
        self.failure_threshold = Some(failures);
        self
    }

    /// `(success, failure)` thresholds for `children` children.
    pub fn resolve(&self, children: usize) -> (usize, usize) {
        let success = self.success_threshold.unwrap_or(children);
        let failure = self
            .failure_threshold
            .unwrap_or_else(|| children.saturating_sub(success) + 1);
        (success, failure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepeatLimit {
    Count(u32),
    Forever,
}

/// Closed set of node variants.
pub enum NodeKind<W>
where
    W: WorldView,
{
    Selector,
    Sequence,
    ReactiveSelector,
    ReactiveSequence,
    Parallel(ParallelPolicy),
    Inverter,
    Repeater(RepeatLimit),
    Timeout(f32),
    Condition(Box<dyn Condition<W>>),
    Action(Box<dyn Action<W>>),
}

impl<W: WorldView> NodeKind<W> {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Selector => "selector",
            NodeKind::Sequence => "sequence",
            NodeKind::ReactiveSelector => "reactive_selector",
            NodeKind::ReactiveSequence => "reactive_sequence",
            NodeKind::Parallel(_) => "parallel",
            NodeKind::Inverter => "inverter",
            NodeKind::Repeater(_) => "repeater",
            NodeKind::Timeout(_) => "timeout",
            NodeKind::Condition(_) => "condition",
            NodeKind::Action(_) => "action",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            NodeKind::Selector
                | NodeKind::Sequence
                | NodeKind::ReactiveSelector
                | NodeKind::ReactiveSequence
                | NodeKind::Parallel(_)
        )
    }

    pub fn is_decorator(&self) -> bool {
        matches!(
            self,
            NodeKind::Inverter | NodeKind::Repeater(_) | NodeKind::Timeout(_)
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Condition(_) | NodeKind::Action(_))
    }
}

impl<W: WorldView> fmt::Debug for NodeKind<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Parallel(policy) => f.debug_tuple("Parallel").field(policy).finish(),
            NodeKind::Repeater(limit) => f.debug_tuple("Repeater").field(limit).finish(),
            NodeKind::Timeout(seconds) => f.debug_tuple("Timeout").field(seconds).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Arena slot: topology only.
pub(crate) struct NodeSlot<W>
where
    W: WorldView,
{
    pub(crate) name: Cow<'static, str>,
    pub(crate) kind: NodeKind<W>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: u16,
}

/// Per-node run state, stored apart from the topology.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NodeState {
    /// `None` = fresh (never run, or reset by a halt).
    pub(crate) status: Option<BtStatus>,
    /// Resume index for memory composites.
    pub(crate) cursor: u32,
    /// Completed iterations for repeaters.
    pub(crate) count: u32,
    /// Seconds spent `Running` in the current run.
    pub(crate) elapsed: f32,
    /// Set while the node keeps failing to evaluate; cleared on the next clean evaluation.
    pub(crate) degraded: bool,
}

impl NodeState {
    pub(crate) fn is_running(&self) -> bool {
        self.status == Some(BtStatus::Running)
    }

    /// Forget the current run but keep the degradation latch.
    pub(crate) fn rewind(&mut self) {
        *self = NodeState {
            degraded: self.degraded,
            ..NodeState::default()
        };
    }
}
