//! Behavior tree runtime built on `ai-core`.
//!
//! Trees are assembled with a [`TreeBuilder`] (or from a declarative
//! [`TreeSpec`] plus a [`NodeRegistry`]) into an arena of nodes with a
//! parallel run-state array. A [`BehaviorTree`] never changes shape after
//! `build()`; behavior is steered only through the blackboard.
//!
//! Composite reset policies:
//! - `Selector` / `Sequence` keep a resume cursor and only rewind it when they
//!   return a terminal status.
//! - `ReactiveSelector` / `ReactiveSequence` re-evaluate from the first child
//!   every tick and halt a running child that is no longer chosen.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod builder;
pub mod leaves;
pub mod nodes;
pub mod registry;
pub mod spec;
pub mod tree;

pub use bt::{BtStatus, NodeId};
pub use builder::{BuildError, TreeBuilder, DEFAULT_MAX_DEPTH};
pub use nodes::{Condition, ConditionFn, NodeKind, ParallelPolicy, RepeatLimit};
pub use registry::NodeRegistry;
pub use spec::{NodeSpec, TreeSpec};
pub use tree::{BehaviorTree, NodeView};
