//! Tooling primitives for deterministic game AI.
//!
//! This crate is intentionally lightweight and engine-agnostic. It defines the
//! debug/telemetry side channel the runtime crates report into; inspectors and
//! visualizers live elsewhere and only consume [`TraceEvent`]s.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    emit, enabled, tags, NullTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink, TRACE_LOG,
    TRACE_SINK,
};
