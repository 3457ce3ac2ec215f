use std::borrow::Cow;

use ai_core::{Action, ActionFn, ActionStatus, Blackboard, BlackboardError, Commands, TickContext, WorldView};

use crate::bt::NodeId;
use crate::nodes::{Condition, ConditionFn, NodeKind, NodeSlot, ParallelPolicy, RepeatLimit};
use crate::registry::NodeRegistry;
use crate::tree::BehaviorTree;

/// Deepest nesting accepted unless overridden with [`TreeBuilder::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("tree `{tree}`: {open} scope(s) still open at build(), innermost `{node}`")]
    UnclosedScope {
        tree: String,
        node: String,
        open: usize,
    },

    #[error("tree `{tree}`: decorator `{node}` takes exactly one child")]
    DecoratorArity { tree: String, node: String },

    #[error("tree `{tree}`: decorator `{node}` closed without a child")]
    EmptyDecorator { tree: String, node: String },

    #[error("tree `{tree}`: composite `{node}` closed without children")]
    EmptyComposite { tree: String, node: String },

    #[error("tree `{tree}`: leaf `{node}` added with no open composite or decorator")]
    NoOpenScope { tree: String, node: String },

    #[error("tree `{tree}`: end() called with no open scope")]
    UnbalancedEnd { tree: String },

    #[error("tree `{tree}`: `{node}` would be a second root")]
    MultipleRoots { tree: String, node: String },

    #[error("tree `{tree}` has no nodes")]
    Empty { tree: String },

    #[error("tree `{tree}`: `{node}` exceeds the maximum depth of {max}")]
    TooDeep {
        tree: String,
        node: String,
        max: usize,
    },

    #[error("tree `{tree}`: node `{node}`: {reason}")]
    InvalidParameter {
        tree: String,
        node: String,
        reason: String,
    },

    #[error("tree `{tree}`: no {kind} named `{name}` is registered")]
    UnknownNode {
        tree: String,
        kind: &'static str,
        name: String,
    },
}

/// Assembles a [`BehaviorTree`] through an explicit stack of open scopes.
///
/// Composites and decorators open a scope, leaves attach to the innermost
/// open scope, `end()` closes it. The first error is kept and returned by
/// [`build`](Self::build); later calls are ignored.
///
/// ```
/// use ai_bt::TreeBuilder;
/// use ai_core::{ActionStatus, WorldView};
///
/// struct World;
/// impl WorldView for World {
///     type Agent = u64;
/// }
///
/// let tree = TreeBuilder::<World>::new("guard")
///     .selector("root")
///     .condition("never", |_, _, _, _| Ok(false))
///     .action_fn("idle", |_, _, _, _, _| Ok(ActionStatus::Success))
///     .end()
///     .build()
///     .unwrap();
/// assert_eq!(tree.len(), 3);
/// ```
pub struct TreeBuilder<W>
where
    W: WorldView,
{
    tree: Cow<'static, str>,
    nodes: Vec<NodeSlot<W>>,
    scopes: Vec<NodeId>,
    max_depth: usize,
    error: Option<BuildError>,
}

impl<W> TreeBuilder<W>
where
    W: WorldView,
{
    pub fn new(tree: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tree: tree.into(),
            nodes: Vec::new(),
            scopes: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            error: None,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether an error has been recorded; further calls are no-ops.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Number of scopes currently open.
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    pub fn selector(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.open(name.into(), NodeKind::Selector)
    }

    pub fn sequence(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.open(name.into(), NodeKind::Sequence)
    }

    pub fn reactive_selector(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.open(name.into(), NodeKind::ReactiveSelector)
    }

    pub fn reactive_sequence(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.open(name.into(), NodeKind::ReactiveSequence)
    }

    pub fn parallel(self, name: impl Into<Cow<'static, str>>, policy: ParallelPolicy) -> Self {
        self.open(name.into(), NodeKind::Parallel(policy))
    }

    pub fn inverter(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.open(name.into(), NodeKind::Inverter)
    }

    pub fn repeater(self, name: impl Into<Cow<'static, str>>, limit: RepeatLimit) -> Self {
        let name = name.into();
        if limit == RepeatLimit::Count(0) {
            return self.invalid(name, "repeat count must be at least 1");
        }
        self.open(name, NodeKind::Repeater(limit))
    }

    pub fn timeout(self, name: impl Into<Cow<'static, str>>, seconds: f32) -> Self {
        let name = name.into();
        if !(seconds.is_finite() && seconds > 0.0) {
            return self.invalid(name, "timeout must be a positive number of seconds");
        }
        self.open(name, NodeKind::Timeout(seconds))
    }

    pub fn condition<F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnMut(&TickContext, W::Agent, &W, &Blackboard) -> Result<bool, BlackboardError>
            + 'static,
    {
        self.condition_node(name, ConditionFn::new(f))
    }

    pub fn condition_node(
        self,
        name: impl Into<Cow<'static, str>>,
        condition: impl Condition<W>,
    ) -> Self {
        self.leaf(name.into(), NodeKind::Condition(Box::new(condition)))
    }

    pub fn action(self, name: impl Into<Cow<'static, str>>, action: impl Action<W>) -> Self {
        self.leaf(name.into(), NodeKind::Action(Box::new(action)))
    }

    pub fn action_fn<F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnMut(
                &TickContext,
                W::Agent,
                &W,
                &mut Blackboard,
                &mut Commands,
            ) -> Result<ActionStatus, BlackboardError>
            + 'static,
    {
        self.action(name, ActionFn::new(f))
    }

    /// Instantiate a registered action under its registered name.
    pub fn action_from(self, registry: &NodeRegistry<W>, name: &str) -> Self {
        match registry.make_action(name) {
            Some(action) => self.leaf(Cow::Owned(name.to_owned()), NodeKind::Action(action)),
            None => self.unknown("action", name),
        }
    }

    /// Instantiate a registered condition under its registered name.
    pub fn condition_from(self, registry: &NodeRegistry<W>, name: &str) -> Self {
        match registry.make_condition(name) {
            Some(condition) => {
                self.leaf(Cow::Owned(name.to_owned()), NodeKind::Condition(condition))
            }
            None => self.unknown("condition", name),
        }
    }

    /// Close the innermost open scope.
    pub fn end(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(id) = self.scopes.pop() else {
            self.error = Some(BuildError::UnbalancedEnd {
                tree: self.tree.to_string(),
            });
            return self;
        };

        let slot = &self.nodes[id.index()];
        let children = slot.children.len();
        let error = match &slot.kind {
            kind if kind.is_composite() && children == 0 => Some(BuildError::EmptyComposite {
                tree: self.tree.to_string(),
                node: slot.name.to_string(),
            }),
            kind if kind.is_decorator() && children == 0 => Some(BuildError::EmptyDecorator {
                tree: self.tree.to_string(),
                node: slot.name.to_string(),
            }),
            NodeKind::Parallel(policy) => {
                let (success, failure) = policy.resolve(children);
                if success == 0 || success > children || failure == 0 || failure > children {
                    Some(BuildError::InvalidParameter {
                        tree: self.tree.to_string(),
                        node: slot.name.to_string(),
                        reason: format!(
                            "parallel thresholds (success {success}, failure {failure}) must lie in 1..={children}"
                        ),
                    })
                } else {
                    None
                }
            }
            _ => None,
        };
        self.error = error;
        self
    }

    pub fn build(self) -> Result<BehaviorTree<W>, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(&innermost) = self.scopes.last() {
            return Err(BuildError::UnclosedScope {
                tree: self.tree.to_string(),
                node: self.nodes[innermost.index()].name.to_string(),
                open: self.scopes.len(),
            });
        }
        if self.nodes.is_empty() {
            return Err(BuildError::Empty {
                tree: self.tree.to_string(),
            });
        }
        Ok(BehaviorTree::from_arena(self.tree, self.nodes))
    }

    fn open(mut self, name: Cow<'static, str>, kind: NodeKind<W>) -> Self {
        if let Some(id) = self.push(name, kind) {
            self.scopes.push(id);
        }
        self
    }

    fn leaf(mut self, name: Cow<'static, str>, kind: NodeKind<W>) -> Self {
        if self.error.is_none() && self.scopes.is_empty() {
            self.error = Some(BuildError::NoOpenScope {
                tree: self.tree.to_string(),
                node: name.into_owned(),
            });
            return self;
        }
        self.push(name, kind);
        self
    }

    /// Append a node under the innermost scope (or as root). `None` once an error is recorded.
    fn push(&mut self, name: Cow<'static, str>, kind: NodeKind<W>) -> Option<NodeId> {
        if self.error.is_some() {
            return None;
        }
        let parent = self.scopes.last().copied();
        let depth = match parent {
            Some(parent) => {
                let slot = &self.nodes[parent.index()];
                if slot.kind.is_decorator() && !slot.children.is_empty() {
                    self.error = Some(BuildError::DecoratorArity {
                        tree: self.tree.to_string(),
                        node: slot.name.to_string(),
                    });
                    return None;
                }
                slot.depth as usize + 1
            }
            None if !self.nodes.is_empty() => {
                self.error = Some(BuildError::MultipleRoots {
                    tree: self.tree.to_string(),
                    node: name.into_owned(),
                });
                return None;
            }
            None => 0,
        };
        if depth > self.max_depth {
            self.error = Some(BuildError::TooDeep {
                tree: self.tree.to_string(),
                node: name.into_owned(),
                max: self.max_depth,
            });
            return None;
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            name,
            kind,
            children: Vec::new(),
            parent,
            depth: depth as u16,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        Some(id)
    }

    fn invalid(mut self, name: Cow<'static, str>, reason: &str) -> Self {
        if self.error.is_none() {
            self.error = Some(BuildError::InvalidParameter {
                tree: self.tree.to_string(),
                node: name.into_owned(),
                reason: reason.to_owned(),
            });
        }
        self
    }

    fn unknown(mut self, kind: &'static str, name: &str) -> Self {
        if self.error.is_none() {
            self.error = Some(BuildError::UnknownNode {
                tree: self.tree.to_string(),
                kind,
                name: name.to_owned(),
            });
        }
        self
    }
}
