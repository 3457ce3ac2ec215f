use std::borrow::Cow;
use std::fmt;

use ai_core::{Blackboard, BlackboardError, Commands, TickContext, WorldView};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, tags, TraceEvent};
use tracing::{debug, warn};

use crate::bt::{BtStatus, NodeId};
use crate::nodes::{NodeKind, NodeSlot, NodeState, ParallelPolicy, RepeatLimit};

/// Read-only snapshot of one node, for debug tooling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub kind: &'static str,
    pub parent: Option<NodeId>,
    pub children: &'a [NodeId],
    pub depth: u16,
    /// Last status; `None` while fresh.
    pub status: Option<BtStatus>,
    pub degraded: bool,
}

/// An immutable tree topology plus its run state.
///
/// Built by [`TreeBuilder`](crate::TreeBuilder). The arena is never resized or
/// rewired after construction; `tick` only touches the run-state array.
pub struct BehaviorTree<W>
where
    W: WorldView,
{
    name: Cow<'static, str>,
    nodes: Vec<NodeSlot<W>>,
    states: Vec<NodeState>,
    status: Option<BtStatus>,
    path: Vec<NodeId>,
    ticks: u64,
}

impl<W: WorldView> fmt::Debug for BehaviorTree<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("status", &self.status)
            .field("path", &self.path)
            .finish()
    }
}

impl<W> BehaviorTree<W>
where
    W: WorldView,
{
    pub(crate) fn from_arena(name: Cow<'static, str>, nodes: Vec<NodeSlot<W>>) -> Self {
        let states = vec![NodeState::default(); nodes.len()];
        let max_depth = nodes.iter().map(|n| n.depth as usize).max().unwrap_or(0);
        Self {
            name,
            nodes,
            states,
            status: None,
            path: Vec::with_capacity(max_depth + 1),
            ticks: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Status returned by the root on the last tick.
    pub fn status(&self) -> Option<BtStatus> {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Some(BtStatus::Running)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Evaluate the root once.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> BtStatus {
        let trace = trace_enabled(blackboard);
        let mut eval = Eval {
            nodes: &mut self.nodes,
            states: &mut self.states,
            ctx,
            agent,
            world,
            blackboard,
            commands,
            trace,
        };
        let status = eval.eval(NodeId::ROOT);
        self.status = Some(status);
        self.ticks += 1;
        self.refresh_path();
        status
    }

    /// Cancel every running action and rewind all run state.
    ///
    /// The next `tick` starts from a fresh root evaluation.
    pub fn halt(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        let trace = trace_enabled(blackboard);
        let mut eval = Eval {
            nodes: &mut self.nodes,
            states: &mut self.states,
            ctx,
            agent,
            world,
            blackboard,
            commands,
            trace,
        };
        eval.halt(NodeId::ROOT);
        for state in self.states.iter_mut() {
            state.rewind();
        }
        self.status = None;
        self.path.clear();
    }

    /// Running nodes after the last tick, root first.
    pub fn active_path(&self) -> &[NodeId] {
        &self.path
    }

    /// Name of the deepest running node (usually the running leaf).
    pub fn running_leaf(&self) -> Option<&str> {
        self.path.last().map(|id| &*self.nodes[id.index()].name)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeView<'_>> {
        let slot = self.nodes.get(id.index())?;
        let state = &self.states[id.index()];
        Some(NodeView {
            id,
            name: &slot.name,
            kind: slot.kind.name(),
            parent: slot.parent,
            children: &slot.children,
            depth: slot.depth,
            status: state.status,
            degraded: state.degraded,
        })
    }

    /// First node with the given name, in declaration order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// Every node in declaration order.
    pub fn inspect(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        (0..self.nodes.len()).filter_map(move |i| self.node(NodeId(i as u32)))
    }

    fn refresh_path(&mut self) {
        self.path.clear();
        if !self.states[0].is_running() {
            return;
        }
        self.path.push(NodeId::ROOT);
        let mut k = 0;
        while k < self.path.len() {
            let id = self.path[k];
            for &child in &self.nodes[id.index()].children {
                if self.states[child.index()].is_running() {
                    self.path.push(child);
                }
            }
            k += 1;
        }
    }
}

/// One traversal over the arena. Recursion depth is bounded by the builder's
/// maximum tree depth.
struct Eval<'a, W>
where
    W: WorldView,
{
    nodes: &'a mut [NodeSlot<W>],
    states: &'a mut [NodeState],
    ctx: &'a TickContext,
    agent: W::Agent,
    world: &'a W,
    blackboard: &'a mut Blackboard,
    commands: &'a mut Commands,
    trace: bool,
}

impl<W> Eval<'_, W>
where
    W: WorldView,
{
    fn child(&self, id: NodeId, k: usize) -> NodeId {
        self.nodes[id.index()].children[k]
    }

    fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.index()].children.len()
    }

    fn eval(&mut self, id: NodeId) -> BtStatus {
        let i = id.index();
        let resuming = self.states[i].is_running();
        let status = match self.nodes[i].kind {
            NodeKind::Selector => self.selector(id, resuming),
            NodeKind::Sequence => self.sequence(id, resuming),
            NodeKind::ReactiveSelector => self.reactive(id, resuming, BtStatus::Failure),
            NodeKind::ReactiveSequence => self.reactive(id, resuming, BtStatus::Success),
            NodeKind::Parallel(policy) => self.parallel(id, policy),
            NodeKind::Inverter => {
                let child = self.child(id, 0);
                self.eval(child).invert()
            }
            NodeKind::Repeater(limit) => self.repeater(id, limit, resuming),
            NodeKind::Timeout(seconds) => self.timeout(id, seconds, resuming),
            NodeKind::Condition(_) => self.condition(id),
            NodeKind::Action(_) => self.action(id, resuming),
        };
        self.states[i].status = Some(status);
        if self.trace {
            trace_emit(
                self.blackboard,
                TraceEvent::new(self.ctx.tick, tags::NODE)
                    .with_a(id.0 as u64)
                    .with_b(status.code()),
            );
        }
        status
    }

    fn selector(&mut self, id: NodeId, resuming: bool) -> BtStatus {
        let i = id.index();
        let start = if resuming { self.states[i].cursor as usize } else { 0 };
        for k in start..self.child_count(id) {
            let child = self.child(id, k);
            match self.eval(child) {
                BtStatus::Failure => continue,
                BtStatus::Running => {
                    self.states[i].cursor = k as u32;
                    return BtStatus::Running;
                }
                BtStatus::Success => {
                    self.states[i].cursor = 0;
                    return BtStatus::Success;
                }
            }
        }
        self.states[i].cursor = 0;
        BtStatus::Failure
    }

    fn sequence(&mut self, id: NodeId, resuming: bool) -> BtStatus {
        let i = id.index();
        let start = if resuming { self.states[i].cursor as usize } else { 0 };
        for k in start..self.child_count(id) {
            let child = self.child(id, k);
            match self.eval(child) {
                BtStatus::Success => continue,
                BtStatus::Running => {
                    self.states[i].cursor = k as u32;
                    return BtStatus::Running;
                }
                BtStatus::Failure => {
                    self.states[i].cursor = 0;
                    return BtStatus::Failure;
                }
            }
        }
        self.states[i].cursor = 0;
        BtStatus::Success
    }

    /// Reactive selector (`skip = Failure`) or sequence (`skip = Success`).
    fn reactive(&mut self, id: NodeId, resuming: bool, skip: BtStatus) -> BtStatus {
        let i = id.index();
        let previous = resuming.then(|| self.states[i].cursor as usize);
        for k in 0..self.child_count(id) {
            let child = self.child(id, k);
            let status = self.eval(child);
            if status == skip {
                continue;
            }
            if let Some(prev) = previous.filter(|&p| p != k) {
                let prev = self.child(id, prev);
                self.halt(prev);
            }
            self.states[i].cursor = if status == BtStatus::Running { k as u32 } else { 0 };
            return status;
        }
        self.states[i].cursor = 0;
        skip
    }

    /// Every child is evaluated every tick; the policy decides on this tick's results.
    fn parallel(&mut self, id: NodeId, policy: ParallelPolicy) -> BtStatus {
        let n = self.child_count(id);
        let (need_success, need_failure) = policy.resolve(n);
        let mut successes = 0;
        let mut failures = 0;
        for k in 0..n {
            let child = self.child(id, k);
            match self.eval(child) {
                BtStatus::Success => successes += 1,
                BtStatus::Failure => failures += 1,
                BtStatus::Running => {}
            }
        }

        let decided = if successes >= need_success {
            BtStatus::Success
        } else if failures >= need_failure {
            BtStatus::Failure
        } else {
            return BtStatus::Running;
        };
        for k in 0..n {
            let child = self.child(id, k);
            self.halt(child);
        }
        decided
    }

    fn repeater(&mut self, id: NodeId, limit: RepeatLimit, resuming: bool) -> BtStatus {
        let i = id.index();
        if !resuming {
            self.states[i].count = 0;
        }
        let child = self.child(id, 0);
        let status = self.eval(child);
        if status == BtStatus::Running {
            return BtStatus::Running;
        }
        self.states[i].count = self.states[i].count.saturating_add(1);
        match limit {
            RepeatLimit::Count(n) if self.states[i].count >= n => {
                self.states[i].count = 0;
                status
            }
            _ => BtStatus::Running,
        }
    }

    fn timeout(&mut self, id: NodeId, seconds: f32, resuming: bool) -> BtStatus {
        let i = id.index();
        if resuming {
            self.states[i].elapsed += self.ctx.dt();
        } else {
            self.states[i].elapsed = 0.0;
        }
        let child = self.child(id, 0);
        if self.states[i].elapsed > seconds {
            self.halt(child);
            self.timed_out(id, seconds);
            return BtStatus::Failure;
        }
        self.eval(child)
    }

    fn condition(&mut self, id: NodeId) -> BtStatus {
        let i = id.index();
        let result = match &mut self.nodes[i].kind {
            NodeKind::Condition(condition) => {
                condition.check(self.ctx, self.agent, self.world, self.blackboard)
            }
            _ => return BtStatus::Failure,
        };
        match result {
            Ok(passed) => {
                self.states[i].degraded = false;
                BtStatus::from(passed)
            }
            Err(err) => {
                self.degrade(id, &err);
                BtStatus::Failure
            }
        }
    }

    fn action(&mut self, id: NodeId, resuming: bool) -> BtStatus {
        let i = id.index();
        if resuming {
            self.states[i].elapsed += self.ctx.dt();
        } else {
            self.states[i].elapsed = 0.0;
        }
        let elapsed = self.states[i].elapsed;

        let NodeKind::Action(action) = &mut self.nodes[i].kind else {
            return BtStatus::Failure;
        };
        if let Some(limit) = action.max_duration() {
            if resuming && elapsed > limit {
                action.cancel(self.ctx, self.agent, self.world, self.blackboard, self.commands);
                self.timed_out(id, limit);
                return BtStatus::Failure;
            }
        }
        match action.tick(self.ctx, self.agent, self.world, self.blackboard, self.commands) {
            Ok(status) => {
                self.states[i].degraded = false;
                status.into()
            }
            Err(err) => {
                if resuming {
                    action.cancel(self.ctx, self.agent, self.world, self.blackboard, self.commands);
                }
                self.degrade(id, &err);
                BtStatus::Failure
            }
        }
    }

    /// Rewind a running subtree, cancelling running actions bottom-up.
    fn halt(&mut self, id: NodeId) {
        let i = id.index();
        if !self.states[i].is_running() {
            return;
        }
        if let NodeKind::Action(action) = &mut self.nodes[i].kind {
            action.cancel(self.ctx, self.agent, self.world, self.blackboard, self.commands);
        } else {
            for k in 0..self.child_count(id) {
                let child = self.child(id, k);
                self.halt(child);
            }
        }
        self.states[i].rewind();
        if self.trace {
            trace_emit(
                self.blackboard,
                TraceEvent::new(self.ctx.tick, tags::HALT).with_a(id.0 as u64),
            );
        }
    }

    fn timed_out(&mut self, id: NodeId, limit: f32) {
        debug!(
            agent = ?self.agent,
            node = %self.nodes[id.index()].name,
            limit,
            "running node exceeded its duration bound"
        );
        self.states[id.index()].elapsed = 0.0;
        if self.trace {
            trace_emit(
                self.blackboard,
                TraceEvent::new(self.ctx.tick, tags::TIMEOUT)
                    .with_a(id.0 as u64)
                    .with_detail(self.nodes[id.index()].name.clone()),
            );
        }
    }

    /// Report an evaluation error once per occurrence.
    fn degrade(&mut self, id: NodeId, err: &BlackboardError) {
        let state = &mut self.states[id.index()];
        if state.degraded {
            return;
        }
        state.degraded = true;
        let name = &self.nodes[id.index()].name;
        warn!(
            agent = ?self.agent,
            node = %name,
            key = err.key(),
            error = %err,
            "node could not evaluate, treating as failure"
        );
        if self.trace {
            trace_emit(
                self.blackboard,
                TraceEvent::new(self.ctx.tick, tags::DEGRADED)
                    .with_a(id.0 as u64)
                    .with_detail(err.to_string()),
            );
        }
    }
}
