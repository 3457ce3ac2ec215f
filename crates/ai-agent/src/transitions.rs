use std::borrow::Cow;
use std::fmt;

use ai_core::keys::AI_STATE_SINCE;
use ai_core::{Blackboard, Timestamp};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::AiState;

type Predicate = Box<dyn Fn(&Blackboard) -> bool>;

/// One `(from, condition) -> to` rule.
pub struct Transition {
    /// `None` matches every state.
    pub from: Option<AiState>,
    pub to: AiState,
    pub name: Cow<'static, str>,
    condition: Predicate,
}

impl Transition {
    pub fn new(
        from: Option<AiState>,
        to: AiState,
        name: impl Into<Cow<'static, str>>,
        condition: impl Fn(&Blackboard) -> bool + 'static,
    ) -> Self {
        Self {
            from,
            to,
            name: name.into(),
            condition: Box::new(condition),
        }
    }

    /// Whether this rule fires in `state`. Rules never fire into the state
    /// the agent is already in.
    pub fn applies(&self, state: AiState, blackboard: &Blackboard) -> bool {
        self.to != state
            && self.from.map_or(true, |from| from == state)
            && (self.condition)(blackboard)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered transition rules; the first rule that applies wins.
#[derive(Debug, Default)]
pub struct TransitionTable {
    rules: Vec<Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        from: AiState,
        to: AiState,
        name: impl Into<Cow<'static, str>>,
        condition: impl Fn(&Blackboard) -> bool + 'static,
    ) -> Self {
        self.rules
            .push(Transition::new(Some(from), to, name, condition));
        self
    }

    pub fn from_any(
        mut self,
        to: AiState,
        name: impl Into<Cow<'static, str>>,
        condition: impl Fn(&Blackboard) -> bool + 'static,
    ) -> Self {
        self.rules.push(Transition::new(None, to, name, condition));
        self
    }

    pub fn push(&mut self, rule: Transition) {
        self.rules.push(rule);
    }

    /// Compile declarative rules, keeping their order.
    pub fn from_specs(specs: &[TransitionSpec]) -> Self {
        let mut table = Self::new();
        for spec in specs {
            table.push(spec.compile());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Transition] {
        &self.rules
    }

    /// Every state some rule can switch into.
    pub fn targets(&self) -> impl Iterator<Item = AiState> + '_ {
        self.rules.iter().map(|r| r.to)
    }

    pub fn evaluate(&self, state: AiState, blackboard: &Blackboard) -> Option<&Transition> {
        self.rules.iter().find(|r| r.applies(state, blackboard))
    }
}

/// Declarative transition condition over blackboard values.
///
/// Missing or mistyped keys make a guard false.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Guard {
    Flag {
        key: String,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        value: bool,
    },
    Below {
        key: String,
        threshold: f32,
    },
    Above {
        key: String,
        threshold: f32,
    },
    Present {
        key: String,
    },
    Absent {
        key: String,
    },
    /// The agent has been in its current state for at least `ticks` ticks.
    InStateFor {
        ticks: u64,
    },
    /// The timestamp stored at `key` is at least `ticks` old (or absent).
    OlderThan {
        key: String,
        ticks: u64,
    },
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Guard {
    pub fn check(&self, blackboard: &Blackboard) -> bool {
        let now = blackboard.now();
        match self {
            Guard::Flag { key, value } => blackboard.require_named::<bool>(key) == Ok(*value),
            Guard::Below { key, threshold } => blackboard
                .require_named::<f32>(key)
                .is_ok_and(|v| v < *threshold),
            Guard::Above { key, threshold } => blackboard
                .require_named::<f32>(key)
                .is_ok_and(|v| v > *threshold),
            Guard::Present { key } => blackboard.contains(key),
            Guard::Absent { key } => !blackboard.contains(key),
            Guard::InStateFor { ticks } => blackboard
                .get(AI_STATE_SINCE)
                .is_some_and(|since| since.age(now) >= *ticks),
            Guard::OlderThan { key, ticks } => blackboard
                .require_named::<Timestamp>(key)
                .map_or(true, |at| at.age(now) >= *ticks),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionSpec {
    #[cfg_attr(feature = "serde", serde(default))]
    pub from: Option<AiState>,
    pub to: AiState,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// All guards must hold.
    pub when: Vec<Guard>,
}

impl TransitionSpec {
    pub fn compile(&self) -> Transition {
        let name = match &self.name {
            Some(name) => Cow::Owned(name.clone()),
            None => Cow::Owned(match self.from {
                Some(from) => format!("{from}->{}", self.to),
                None => format!("*->{}", self.to),
            }),
        };
        let guards = self.when.clone();
        Transition::new(self.from, self.to, name, move |bb| {
            guards.iter().all(|g| g.check(bb))
        })
    }
}
