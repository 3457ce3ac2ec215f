use crate::AgentId;

/// Read-only world access.
///
/// During a frame every agent sees the same snapshot through `&W`; anything an
/// agent wants to change goes out as a [`Command`](crate::Command) and lands
/// after all agents have ticked.
///
/// The core crate does not prescribe which queries a world must expose;
/// subsystems (nav, perception, ...) define extension traits.
pub trait WorldView: 'static {
    type Agent: AgentId;
}
