//! Declarative tree descriptions.
//!
//! A [`TreeSpec`] is plain data (loadable from YAML/JSON with the `serde`
//! feature) that is instantiated against a [`NodeRegistry`] into a
//! [`BehaviorTree`]. Names that are not registered are build errors.

use std::borrow::Cow;

use ai_core::WorldView;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::builder::{BuildError, TreeBuilder};
use crate::leaves::{Compare, FlagSet, Fresh, Wait};
use crate::nodes::{ParallelPolicy, RepeatLimit};
use crate::registry::NodeRegistry;
use crate::tree::BehaviorTree;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeSpec {
    pub name: String,
    pub root: NodeSpec,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum NodeSpec {
    Selector {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        children: Vec<NodeSpec>,
    },
    Sequence {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        children: Vec<NodeSpec>,
    },
    ReactiveSelector {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        children: Vec<NodeSpec>,
    },
    ReactiveSequence {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        children: Vec<NodeSpec>,
    },
    Parallel {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        policy: ParallelPolicy,
        children: Vec<NodeSpec>,
    },
    Inverter {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        child: Box<NodeSpec>,
    },
    Repeater {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        limit: RepeatLimit,
        child: Box<NodeSpec>,
    },
    Timeout {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        seconds: f32,
        child: Box<NodeSpec>,
    },
    /// Registered action.
    Action { name: String },
    /// Registered condition.
    Condition { name: String },
    /// Boolean blackboard key is `true`.
    Flag { key: String },
    Below { key: String, threshold: f32 },
    Above { key: String, threshold: f32 },
    Fresh { key: String, max_age_ticks: u64 },
    Wait { seconds: f32 },
}

impl TreeSpec {
    pub fn build<W: WorldView>(
        &self,
        registry: &NodeRegistry<W>,
    ) -> Result<BehaviorTree<W>, BuildError> {
        let builder = TreeBuilder::new(self.name.clone());
        self.root.append(builder, registry).build()
    }
}

fn label(name: &Option<String>, kind: &'static str) -> Cow<'static, str> {
    match name {
        Some(name) => Cow::Owned(name.clone()),
        None => Cow::Borrowed(kind),
    }
}

impl NodeSpec {
    fn append<W: WorldView>(
        &self,
        builder: TreeBuilder<W>,
        registry: &NodeRegistry<W>,
    ) -> TreeBuilder<W> {
        if builder.failed() {
            return builder;
        }
        match self {
            NodeSpec::Selector { name, children } => {
                Self::scope(builder.selector(label(name, "selector")), children, registry)
            }
            NodeSpec::Sequence { name, children } => {
                Self::scope(builder.sequence(label(name, "sequence")), children, registry)
            }
            NodeSpec::ReactiveSelector { name, children } => Self::scope(
                builder.reactive_selector(label(name, "reactive_selector")),
                children,
                registry,
            ),
            NodeSpec::ReactiveSequence { name, children } => Self::scope(
                builder.reactive_sequence(label(name, "reactive_sequence")),
                children,
                registry,
            ),
            NodeSpec::Parallel {
                name,
                policy,
                children,
            } => Self::scope(
                builder.parallel(label(name, "parallel"), *policy),
                children,
                registry,
            ),
            NodeSpec::Inverter { name, child } => Self::scope(
                builder.inverter(label(name, "inverter")),
                std::slice::from_ref(child.as_ref()),
                registry,
            ),
            NodeSpec::Repeater { name, limit, child } => Self::scope(
                builder.repeater(label(name, "repeater"), *limit),
                std::slice::from_ref(child.as_ref()),
                registry,
            ),
            NodeSpec::Timeout {
                name,
                seconds,
                child,
            } => Self::scope(
                builder.timeout(label(name, "timeout"), *seconds),
                std::slice::from_ref(child.as_ref()),
                registry,
            ),
            NodeSpec::Action { name } => builder.action_from(registry, name),
            NodeSpec::Condition { name } => builder.condition_from(registry, name),
            NodeSpec::Flag { key } => {
                builder.condition_node(format!("flag({key})"), FlagSet::new(key.clone()))
            }
            NodeSpec::Below { key, threshold } => builder.condition_node(
                format!("{key} < {threshold}"),
                Compare::below(key.clone(), *threshold),
            ),
            NodeSpec::Above { key, threshold } => builder.condition_node(
                format!("{key} > {threshold}"),
                Compare::above(key.clone(), *threshold),
            ),
            NodeSpec::Fresh { key, max_age_ticks } => builder.condition_node(
                format!("fresh({key})"),
                Fresh::new(key.clone(), *max_age_ticks),
            ),
            NodeSpec::Wait { seconds } => {
                builder.action(format!("wait({seconds}s)"), Wait::new(*seconds))
            }
        }
    }

    fn scope<W: WorldView>(
        mut builder: TreeBuilder<W>,
        children: &[NodeSpec],
        registry: &NodeRegistry<W>,
    ) -> TreeBuilder<W> {
        for child in children {
            builder = child.append(builder, registry);
        }
        builder.end()
    }
}
