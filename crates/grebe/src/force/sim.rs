//! Force application and the cooled iteration loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::grid::Grid;
use super::place::Placement;
use super::{Params, XorShift64Star};
use crate::LayoutGraph;
use crate::model::Point;

#[derive(Debug, Clone, Copy)]
struct SpringEdge {
    p: usize,
    q: usize,
    /// Force scale; the edge weight.
    factor: f64,
    /// Ideal spring length.
    dist: f64,
}

/// One layout pass worth of state: working positions, the displacement
/// buffer, derived spring data, and the (optional) repulsion grid. Dropped
/// whole at the end of the call.
pub(super) struct Sim {
    k2: f64,
    cell: f64,
    use_new: bool,
    use_grid: bool,
    pos: Vec<Point>,
    disp: Vec<Point>,
    fixed: Vec<bool>,
    is_port: Vec<bool>,
    has_ports: bool,
    wd2: f64,
    ht2: f64,
    edges: Vec<SpringEdge>,
    rng: XorShift64Star,
    grid: Grid,
}

impl Sim {
    pub(super) fn new(
        g: &LayoutGraph,
        placement: Placement,
        params: &Params,
        rng: XorShift64Star,
    ) -> Self {
        let edges = g
            .edge_ids()
            .map(|e| {
                let (t, h) = g.endpoints(e);
                let lbl = g.edge(e);
                SpringEdge {
                    p: t.index(),
                    q: h.index(),
                    factor: lbl.weight.max(0.0),
                    dist: lbl.len.filter(|&l| l > 0.0).unwrap_or(params.k),
                }
            })
            .collect();

        let n = placement.pos.len();
        Self {
            k2: params.k * params.k,
            cell: params.k,
            use_new: params.use_new,
            use_grid: params.use_grid,
            pos: placement.pos,
            disp: vec![Point::default(); n],
            fixed: placement.fixed,
            is_port: placement.is_port,
            has_ports: placement.has_ports,
            wd2: placement.wd * placement.wd,
            ht2: placement.ht * placement.ht,
            edges,
            rng,
            grid: Grid::default(),
        }
    }

    pub(super) fn position(&self, ix: usize) -> Point {
        self.pos[ix]
    }

    pub(super) fn run(
        &mut self,
        t0: f64,
        num_iters: usize,
        loopcnt: usize,
        cancel: Option<&AtomicBool>,
    ) {
        let start = Instant::now();
        let mut ran = 0usize;
        for i in 0..loopcnt {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                tracing::debug!(iterations = ran, "layout cancelled");
                break;
            }
            let temp = t0 * ((num_iters - i) as f64) / num_iters as f64;
            if temp <= 0.0 {
                break;
            }
            self.one_iteration(temp);
            ran += 1;
        }
        tracing::debug!(
            nodes = self.pos.len(),
            edges = self.edges.len(),
            iterations = ran,
            grid = self.use_grid,
            elapsed = ?start.elapsed(),
            "spring layout pass done"
        );
    }

    fn one_iteration(&mut self, temp: f64) {
        self.disp.fill(Point::default());
        if self.use_grid {
            self.grid_repulsion();
        } else {
            self.all_pairs_repulsion();
        }
        self.attraction();
        self.update_pos(temp);
    }

    fn all_pairs_repulsion(&mut self) {
        for p in 0..self.pos.len() {
            for q in p + 1..self.pos.len() {
                let dx = self.pos[q].x - self.pos[p].x;
                let dy = self.pos[q].y - self.pos[p].y;
                self.repel(p, q, dx, dy, dx * dx + dy * dy);
            }
        }
    }

    /// Repulsion against the own cell (every ordered pair) and the eight
    /// neighbor cells, gated on squared distance below the cell size.
    fn grid_repulsion(&mut self) {
        let mut grid = std::mem::take(&mut self.grid);
        grid.clear();
        for v in 0..self.pos.len() {
            let ci = (self.pos[v].x / self.cell).floor() as i64;
            let cj = (self.pos[v].y / self.cell).floor() as i64;
            grid.insert((ci, cj), v);
        }

        let cell2 = self.cell * self.cell;
        for cell in grid.cells() {
            for (a, &p) in cell.nodes.iter().enumerate() {
                for (b, &q) in cell.nodes.iter().enumerate() {
                    if a == b {
                        continue;
                    }
                    let dx = self.pos[q].x - self.pos[p].x;
                    let dy = self.pos[q].y - self.pos[p].y;
                    self.repel(p, q, dx, dy, dx * dx + dy * dy);
                }
            }

            let (ci, cj) = cell.coords;
            for di in -1i64..=1 {
                for dj in -1i64..=1 {
                    if di == 0 && dj == 0 {
                        continue;
                    }
                    let Some(neighbor) = grid.cell_at((ci + di, cj + dj)) else {
                        continue;
                    };
                    for &p in &cell.nodes {
                        for &q in &neighbor.nodes {
                            let dx = self.pos[q].x - self.pos[p].x;
                            let dy = self.pos[q].y - self.pos[p].y;
                            let d2 = dx * dx + dy * dy;
                            if d2 < cell2 {
                                self.repel(p, q, dx, dy, d2);
                            }
                        }
                    }
                }
            }
        }
        self.grid = grid;
    }

    fn repel(&mut self, p: usize, q: usize, mut dx: f64, mut dy: f64, mut d2: f64) {
        while d2 == 0.0 {
            dx = self.rng.jitter();
            dy = self.rng.jitter();
            d2 = dx * dx + dy * dy;
        }
        let mut force = if self.use_new {
            self.k2 / (d2 * d2.sqrt())
        } else {
            self.k2 / d2
        };
        if self.is_port[p] && self.is_port[q] {
            // Keep attachment points from collapsing together.
            force *= 10.0;
        }
        self.disp[q].x += dx * force;
        self.disp[q].y += dy * force;
        self.disp[p].x -= dx * force;
        self.disp[p].y -= dy * force;
    }

    fn attraction(&mut self) {
        for i in 0..self.edges.len() {
            let SpringEdge { p, q, factor, dist } = self.edges[i];
            if p == q {
                continue;
            }
            let mut dx = self.pos[q].x - self.pos[p].x;
            let mut dy = self.pos[q].y - self.pos[p].y;
            let mut d2 = dx * dx + dy * dy;
            while d2 == 0.0 {
                dx = self.rng.jitter();
                dy = self.rng.jitter();
                d2 = dx * dx + dy * dy;
            }
            let d = d2.sqrt();
            let force = if self.use_new {
                factor * (d - dist) / d
            } else {
                factor * d / dist
            };
            self.disp[q].x -= dx * force;
            self.disp[q].y -= dy * force;
            self.disp[p].x += dx * force;
            self.disp[p].y += dy * force;
        }
    }

    /// Applies accumulated displacement, clamped to the temperature, then
    /// projects against the boundary ellipse when ports are present: ports
    /// land exactly on the boundary, interior nodes are pulled back inside.
    fn update_pos(&mut self, temp: f64) {
        let temp2 = temp * temp;
        for v in 0..self.pos.len() {
            if self.fixed[v] {
                continue;
            }
            let dx = self.disp[v].x;
            let dy = self.disp[v].y;
            let len2 = dx * dx + dy * dy;
            let (mut x, mut y) = if len2 < temp2 {
                (self.pos[v].x + dx, self.pos[v].y + dy)
            } else {
                let f = temp / len2.sqrt();
                (self.pos[v].x + dx * f, self.pos[v].y + dy * f)
            };

            if self.has_ports {
                let d = ((x * x) / self.wd2 + (y * y) / self.ht2).sqrt();
                if self.is_port[v] {
                    if d > 0.0 {
                        x /= d;
                        y /= d;
                    }
                } else if d >= 1.0 {
                    let f = 0.95 / d;
                    x *= f;
                    y *= f;
                }
            }
            self.pos[v] = Point::new(x, y);
        }
    }
}
