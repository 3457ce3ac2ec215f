use std::collections::BTreeMap;
use std::fmt;

use ai_bt::{BehaviorTree, BtStatus};
use ai_core::keys::{AI_STATE, AI_STATE_SINCE, CONTROLLER_KEYS};
use ai_core::{Blackboard, Commands, TickContext, Timestamp};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, tags, TraceEvent};
use tracing::{debug, warn};

use crate::perception::{refresh_perception, SenseWorldView};
use crate::transitions::TransitionTable;
use crate::AiState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("no behavior tree for state `{state}` (reachable via {via})")]
    MissingTree { state: AiState, via: String },
}

enum Trees<W>
where
    W: SenseWorldView,
{
    /// One tree; the state is only a gate read from the blackboard.
    Single(BehaviorTree<W>),
    /// One independently resumable tree per state.
    Hybrid(BTreeMap<AiState, BehaviorTree<W>>),
}

impl<W: SenseWorldView> Trees<W> {
    fn get_mut(&mut self, state: AiState) -> Option<&mut BehaviorTree<W>> {
        match self {
            Trees::Single(tree) => Some(tree),
            Trees::Hybrid(trees) => trees.get_mut(&state),
        }
    }
}

/// Per-agent decision maker: one blackboard, one tree (or one per state),
/// the discrete state and its transition table, and a reusable command buffer.
///
/// Dropping a controller drops any running actions without cancelling them.
pub struct AiController<W>
where
    W: SenseWorldView,
{
    agent: W::Agent,
    blackboard: Blackboard,
    trees: Trees<W>,
    state: AiState,
    transitions: TransitionTable,
    commands: Commands,
    last_status: Option<BtStatus>,
    halt_on_exit: bool,
}

impl<W: SenseWorldView> fmt::Debug for AiController<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiController")
            .field("agent", &self.agent)
            .field("state", &self.state)
            .field("last_status", &self.last_status)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

impl<W> AiController<W>
where
    W: SenseWorldView,
{
    /// Controller with one tree for every state.
    pub fn single(
        agent: W::Agent,
        tree: BehaviorTree<W>,
        initial: AiState,
        transitions: TransitionTable,
    ) -> Self {
        Self::with_trees(agent, Trees::Single(tree), initial, transitions)
    }

    /// Controller with a tree per state.
    ///
    /// Every state the agent can be in (the initial state and every
    /// transition target) must have a tree.
    pub fn hybrid(
        agent: W::Agent,
        trees: BTreeMap<AiState, BehaviorTree<W>>,
        initial: AiState,
        transitions: TransitionTable,
    ) -> Result<Self, ControllerError> {
        if !trees.contains_key(&initial) {
            return Err(ControllerError::MissingTree {
                state: initial,
                via: "initial state".to_owned(),
            });
        }
        if let Some(rule) = transitions
            .rules()
            .iter()
            .find(|r| !trees.contains_key(&r.to))
        {
            return Err(ControllerError::MissingTree {
                state: rule.to,
                via: format!("transition `{}`", rule.name),
            });
        }
        Ok(Self::with_trees(
            agent,
            Trees::Hybrid(trees),
            initial,
            transitions,
        ))
    }

    fn with_trees(
        agent: W::Agent,
        trees: Trees<W>,
        initial: AiState,
        transitions: TransitionTable,
    ) -> Self {
        let mut blackboard = Blackboard::new();
        blackboard.set(AI_STATE, initial.handle());
        blackboard.set(AI_STATE_SINCE, Timestamp(0));
        Self {
            agent,
            blackboard,
            trees,
            state: initial,
            transitions,
            commands: Commands::with_capacity(8),
            last_status: None,
            halt_on_exit: false,
        }
    }

    /// Also halt the tree of the state being left (cancelling its running
    /// actions) instead of leaving it parked until re-entry.
    pub fn halt_on_exit(mut self, enabled: bool) -> Self {
        self.halt_on_exit = enabled;
        self
    }

    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Status of the tree ticked last.
    pub fn last_status(&self) -> Option<BtStatus> {
        self.last_status
    }

    pub fn is_hybrid(&self) -> bool {
        matches!(self.trees, Trees::Hybrid(_))
    }

    /// The tree that runs in the current state.
    pub fn active_tree(&self) -> Option<&BehaviorTree<W>> {
        self.tree_for(self.state)
    }

    pub fn tree_for(&self, state: AiState) -> Option<&BehaviorTree<W>> {
        match &self.trees {
            Trees::Single(tree) => Some(tree),
            Trees::Hybrid(trees) => trees.get(&state),
        }
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// Step 1: stamp the clock and refresh perception keys.
    pub fn perceive(&mut self, ctx: &TickContext, world: &W) {
        self.blackboard.begin_tick(ctx.tick);
        if let Err(err) = refresh_perception(ctx, self.agent, world, &mut self.blackboard) {
            warn!(agent = ?self.agent, error = %err, "perception refresh failed");
        }
    }

    /// Steps 2 and 3: tick the active tree, then evaluate transitions.
    pub fn decide(&mut self, ctx: &TickContext, world: &W) -> BtStatus {
        let status = self.tick_active(ctx, world);
        self.last_status = Some(status);

        let next = self
            .transitions
            .evaluate(self.state, &self.blackboard)
            .map(|rule| (rule.to, rule.name.clone()));
        if let Some((to, rule)) = next {
            self.enter(ctx, world, to, &rule);
        }
        status
    }

    /// Full per-tick lifecycle.
    pub fn tick(&mut self, ctx: &TickContext, world: &W) -> BtStatus {
        self.perceive(ctx, world);
        self.decide(ctx, world)
    }

    /// Switch state outside the transition table (scripted events, tests).
    pub fn force_state(&mut self, ctx: &TickContext, world: &W, state: AiState) {
        if state != self.state {
            self.enter(ctx, world, state, "forced");
        }
    }

    /// Cancel whatever the active tree is running.
    pub fn halt(&mut self, ctx: &TickContext, world: &W) {
        let (agent, state) = (self.agent, self.state);
        if let Some(tree) = self.trees.get_mut(state) {
            tree.halt(ctx, agent, world, &mut self.blackboard, &mut self.commands);
        }
    }

    fn tick_active(&mut self, ctx: &TickContext, world: &W) -> BtStatus {
        let (agent, state) = (self.agent, self.state);
        let Some(tree) = self.trees.get_mut(state) else {
            warn!(agent = ?agent, %state, "no tree for current state");
            return BtStatus::Failure;
        };
        tree.tick(ctx, agent, world, &mut self.blackboard, &mut self.commands)
    }

    fn enter(&mut self, ctx: &TickContext, world: &W, to: AiState, rule: &str) {
        let from = self.state;
        let agent = self.agent;
        debug!(agent = ?agent, %from, %to, rule, "ai state transition");

        if let Trees::Hybrid(trees) = &mut self.trees {
            if self.halt_on_exit {
                if let Some(tree) = trees.get_mut(&from) {
                    tree.halt(ctx, agent, world, &mut self.blackboard, &mut self.commands);
                }
            }
            // Re-entry starts from a fresh root evaluation.
            if let Some(tree) = trees.get_mut(&to) {
                tree.halt(ctx, agent, world, &mut self.blackboard, &mut self.commands);
            }
        }

        self.state = to;
        let mut writer = self.blackboard.grant("controller", CONTROLLER_KEYS);
        let written = writer
            .set(AI_STATE, to.handle())
            .and_then(|()| writer.set(AI_STATE_SINCE, Timestamp(ctx.tick)));
        if let Err(err) = written {
            warn!(agent = ?agent, error = %err, "could not record ai state");
        }

        if trace_enabled(&self.blackboard) {
            trace_emit(
                &mut self.blackboard,
                TraceEvent::new(ctx.tick, tags::STATE)
                    .with_a(from.code())
                    .with_b(to.code())
                    .with_detail(rule.to_owned()),
            );
        }
    }
}
