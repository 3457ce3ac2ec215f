use core::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NavPath, Navigator, Vec2};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavGridError {
    #[error("grid must have at least one cell (got {width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("cell size must be a positive number (got {0})")]
    CellSize(f32),

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unexpected cell glyph {glyph:?} at row {row}, column {column}")]
    Glyph { glyph: char, row: usize, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Fixed neighbor order keeps equal-cost routes deterministic.
    fn neighbors(self) -> [Cell; 4] {
        let Cell { x, y } = self;
        [
            Cell { x, y: y - 1 },
            Cell { x: x + 1, y },
            Cell { x, y: y + 1 },
            Cell { x: x - 1, y },
        ]
    }
}

/// Open-list entry ordered as a min-heap on `(f, g, insertion)`.
#[derive(Debug, PartialEq, Eq)]
struct Frontier {
    f: u32,
    g: u32,
    seq: u64,
    index: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f, other.g, other.seq).cmp(&(self.f, self.g, self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uniform grid with 4-connected A* search.
///
/// World coordinates map to cells by `floor(p / cell_size)`; cell `(0, 0)`
/// spans `[0, cell_size)` on both axes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavGrid {
    width: u32,
    height: u32,
    cell_size: f32,
    blocked: Vec<bool>,
}

impl NavGrid {
    pub fn new(width: u32, height: u32, cell_size: f32) -> Result<Self, NavGridError> {
        if width == 0 || height == 0 {
            return Err(NavGridError::Empty { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(NavGridError::CellSize(cell_size));
        }
        Ok(Self {
            width,
            height,
            cell_size,
            blocked: vec![false; width as usize * height as usize],
        })
    }

    /// Parse an ASCII map: `.` walkable, `#` blocked; the first row is `y = 0`.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], cell_size: f32) -> Result<Self, NavGridError> {
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let mut grid = Self::new(width as u32, rows.len() as u32, cell_size)?;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(NavGridError::RaggedRow {
                    row: y,
                    found,
                    expected: width,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                match glyph {
                    '.' => {}
                    '#' => grid.set_blocked(x as i32, y as i32, true),
                    glyph => {
                        return Err(NavGridError::Glyph {
                            glyph,
                            row: y,
                            column: x,
                        })
                    }
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Out-of-bounds writes are ignored.
    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(i) = self.index(Cell { x, y }) {
            self.blocked[i] = blocked;
        }
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.index(Cell { x, y }).map_or(true, |i| self.blocked[i])
    }

    /// World-space extent `(width, height)`.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.cell_size,
            self.height as f32 * self.cell_size,
        )
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let in_bounds = cell.x >= 0
            && cell.y >= 0
            && (cell.x as u32) < self.width
            && (cell.y as u32) < self.height;
        in_bounds.then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    fn cell_at(&self, index: usize) -> Cell {
        let width = self.width as usize;
        Cell {
            x: (index % width) as i32,
            y: (index / width) as i32,
        }
    }

    fn cell_of(&self, p: Vec2) -> Option<Cell> {
        let cell = Cell {
            x: (p.x / self.cell_size).floor() as i32,
            y: (p.y / self.cell_size).floor() as i32,
        };
        self.index(cell).map(|_| cell)
    }

    fn center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Cell indices from `start` to `goal`, both included.
    fn search(&self, start: Cell, goal: Cell) -> Option<Vec<usize>> {
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;
        if self.blocked[start_index] || self.blocked[goal_index] {
            return None;
        }

        let cells = self.blocked.len();
        let mut best = vec![u32::MAX; cells];
        let mut came_from = vec![usize::MAX; cells];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        best[start_index] = 0;
        open.push(Frontier {
            f: start.manhattan(goal),
            g: 0,
            seq,
            index: start_index,
        });

        while let Some(Frontier { g, index, .. }) = open.pop() {
            if index == goal_index {
                let mut route = vec![goal_index];
                let mut at = goal_index;
                while came_from[at] != usize::MAX {
                    at = came_from[at];
                    route.push(at);
                }
                route.reverse();
                return Some(route);
            }
            if g != best[index] {
                continue;
            }
            let cell = self.cell_at(index);
            for next in cell.neighbors() {
                let Some(next_index) = self.index(next) else {
                    continue;
                };
                let cost = g + 1;
                if self.blocked[next_index] || cost >= best[next_index] {
                    continue;
                }
                best[next_index] = cost;
                came_from[next_index] = index;
                seq += 1;
                open.push(Frontier {
                    f: cost + next.manhattan(goal),
                    g: cost,
                    seq,
                    index: next_index,
                });
            }
        }
        None
    }
}

impl Navigator for NavGrid {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Option<NavPath> {
        let route = self.search(self.cell_of(start)?, self.cell_of(goal)?)?;

        // Keep only the cells where the route turns; the exact endpoints replace
        // the first and last cell centers.
        let mut points = vec![start];
        for w in route.windows(3) {
            let (a, b, c) = (self.cell_at(w[0]), self.cell_at(w[1]), self.cell_at(w[2]));
            let straight = (b.x - a.x, b.y - a.y) == (c.x - b.x, c.y - b.y);
            if !straight {
                points.push(self.center(b));
            }
        }
        points.push(goal);
        Some(NavPath::new(points))
    }

    fn is_walkable(&self, point: Vec2) -> bool {
        self.cell_of(point)
            .and_then(|cell| self.index(cell))
            .is_some_and(|i| !self.blocked[i])
    }
}
