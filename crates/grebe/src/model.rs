//! Shared label and geometry types.
//!
//! These are intentionally lightweight and `Clone`-friendly; all algorithm
//! bookkeeping (DFS ranges, displacement buffers, tree adjacency) lives in
//! per-call engine state, not on the labels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// How firmly a node's position is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pinned {
    /// Free; the layout engine both places and moves it.
    #[default]
    None,
    /// Has a user-supplied starting position but moves with the simulation.
    Position,
    /// Never moved by the physics loop.
    Fixed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    /// Integer layer assigned by [`crate::rank`].
    pub rank: Option<i32>,
    /// 2D position assigned by [`crate::force`].
    pub pos: Option<Point>,
    pub pinned: Pinned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    /// Minimum rank separation between head and tail. Non-negative.
    pub minlen: i32,
    /// Cost multiplier for ranking; force scale for layout.
    pub weight: f64,
    /// Ideal spring length; the layout `K` when absent.
    pub len: Option<f64>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            len: None,
        }
    }
}

/// Graph-level configuration attributes, all optional; entry points resolve
/// them against documented defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphLabel {
    /// Pivot-search window for the rank engine (default 30).
    pub searchsize: Option<usize>,
    /// Iteration budget for the force engine (default 600).
    pub maxiter: Option<usize>,
    /// Ideal edge length / spring constant (default 0.3).
    pub k: Option<f64>,
    /// Initial temperature; derived from `k` and node count when absent.
    pub t0: Option<f64>,
    /// Placement seed mode: an integer seed, `"random"`, or `"self"`.
    pub start: Option<String>,
}
