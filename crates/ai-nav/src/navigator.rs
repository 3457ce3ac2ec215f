use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Waypoints from start to goal, both included.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    pub points: Vec<Vec2>,
}

impl NavPath {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn goal(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Pathfinding backend.
///
/// `None` means "no route"; movement actions turn it into `Failure`.
pub trait Navigator {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Option<NavPath>;

    /// Whether an agent may stand at `point`. Backends without the notion accept everything.
    fn is_walkable(&self, _point: Vec2) -> bool {
        true
    }
}

/// Obstacle-free navigator: every path is the straight segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Navigator for OpenField {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Option<NavPath> {
        Some(NavPath::new(vec![start, goal]))
    }
}
