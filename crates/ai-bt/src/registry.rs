use std::collections::BTreeMap;
use std::fmt;

use ai_core::{Action, WorldView};

use crate::nodes::Condition;

type ActionCtor<W> = Box<dyn Fn() -> Box<dyn Action<W>>>;
type ConditionCtor<W> = Box<dyn Fn() -> Box<dyn Condition<W>>>;

/// Name → constructor table for leaves referenced by name (tree specs,
/// [`TreeBuilder::action_from`](crate::TreeBuilder::action_from)).
///
/// Passed explicitly to whatever builds trees; there is no global registry.
pub struct NodeRegistry<W>
where
    W: WorldView,
{
    actions: BTreeMap<String, ActionCtor<W>>,
    conditions: BTreeMap<String, ConditionCtor<W>>,
}

impl<W: WorldView> Default for NodeRegistry<W> {
    fn default() -> Self {
        Self {
            actions: BTreeMap::new(),
            conditions: BTreeMap::new(),
        }
    }
}

impl<W: WorldView> fmt::Debug for NodeRegistry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<W> NodeRegistry<W>
where
    W: WorldView,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an action constructor.
    pub fn register_action<A, F>(&mut self, name: impl Into<String>, make: F) -> &mut Self
    where
        A: Action<W>,
        F: Fn() -> A + 'static,
    {
        self.actions
            .insert(name.into(), Box::new(move || Box::new(make())));
        self
    }

    /// Register (or replace) a condition constructor.
    pub fn register_condition<C, F>(&mut self, name: impl Into<String>, make: F) -> &mut Self
    where
        C: Condition<W>,
        F: Fn() -> C + 'static,
    {
        self.conditions
            .insert(name.into(), Box::new(move || Box::new(make())));
        self
    }

    pub fn make_action(&self, name: &str) -> Option<Box<dyn Action<W>>> {
        self.actions.get(name).map(|make| make())
    }

    pub fn make_condition(&self, name: &str) -> Option<Box<dyn Condition<W>>> {
        self.conditions.get(name).map(|make| make())
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn has_condition(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }
}
