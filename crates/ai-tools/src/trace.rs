#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::VecDeque;

use ai_core::{Blackboard, SlotKey};

/// Event tags emitted by the runtime crates.
pub mod tags {
    /// A behavior node was evaluated. `a` = node id, `b` = status code.
    pub const NODE: &str = "bt.node";
    /// A node could not evaluate (missing/stale/mistyped key). `a` = node id, detail = error.
    pub const DEGRADED: &str = "bt.degraded";
    /// A running node exceeded its duration bound. `a` = node id.
    pub const TIMEOUT: &str = "bt.timeout";
    /// A running subtree was halted. `a` = node id.
    pub const HALT: &str = "bt.halt";
    /// Controller state change. `a` = from, `b` = to.
    pub const STATE: &str = "ai.state";
    /// Boss phase change. `a` = from index, `b` = to index.
    pub const PHASE: &str = "boss.phase";
    /// Attack pattern chosen. `a` = pattern index, detail = pattern id.
    pub const PATTERN: &str = "boss.pattern";
    /// No pattern available; fallback used.
    pub const FALLBACK: &str = "boss.fallback";
    /// Difficulty recomputed. `a` = level index, `b` = skill in thousandths.
    pub const DIFFICULTY: &str = "difficulty.level";
}

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded during simulation and later rendered
/// by tooling. `detail` carries an optional human-readable label (node name, missing key).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub detail: Option<Cow<'static, str>>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
            detail: None,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// In-memory event log, optionally bounded (oldest events are dropped first).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: VecDeque<TraceEvent>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub limit: Option<usize>,
}

impl TraceLog {
    pub fn bounded(limit: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(limit.min(4096)),
            limit: Some(limit),
        }
    }

    pub fn push(&mut self, event: TraceEvent) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.events.len() >= limit {
                self.events.pop_front();
            }
        }
        self.events.push_back(event);
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }
}

/// Blackboard attachment for collecting events in-memory.
pub const TRACE_LOG: SlotKey<TraceLog> = SlotKey::new(0xA11D_7ACE_0000_0001);
/// Blackboard attachment for streaming events into a user-provided sink.
pub const TRACE_SINK: SlotKey<Box<dyn TraceSink>> = SlotKey::new(0xA11D_7ACE_0000_0002);

/// Whether any trace consumer is attached; lets hot paths skip building events.
pub fn enabled(blackboard: &Blackboard) -> bool {
    blackboard.has_attachment(TRACE_LOG) || blackboard.has_attachment(TRACE_SINK)
}

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.attachment_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.attachment_mut(TRACE_SINK) {
        sink.emit(event);
    }
}
