use ai_core::WorldView;

use crate::{Navigator, Vec2};

/// World queries needed by the movement actions.
pub trait NavWorldView: WorldView {
    fn position(&self, agent: Self::Agent) -> Option<Vec2>;
    fn navigator(&self) -> &dyn Navigator;
}
