//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! | feature      | crate           |
//! |--------------|-----------------|
//! | `core`       | blackboard, commands, tick context |
//! | `bt`         | behavior trees, builder, registry, tree specs |
//! | `nav`        | pathfinding interface and movement actions |
//! | `agent`      | perception, AI states, controller, frame driver |
//! | `boss`       | boss phases and telegraphed attack patterns |
//! | `difficulty` | combat statistics and the difficulty director |
//! | `tools`      | trace events and sinks |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use ai_bt as bt;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use ai_nav as nav;

#[cfg(feature = "agent")]
#[cfg_attr(docsrs, doc(cfg(feature = "agent")))]
pub use ai_agent as agent;

#[cfg(feature = "boss")]
#[cfg_attr(docsrs, doc(cfg(feature = "boss")))]
pub use ai_boss as boss;

#[cfg(feature = "difficulty")]
#[cfg_attr(docsrs, doc(cfg(feature = "difficulty")))]
pub use ai_difficulty as difficulty;
