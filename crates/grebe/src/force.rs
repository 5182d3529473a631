//! Spring-electrical layout.
//!
//! Positions nodes in continuous 2D space by iterating inverse-square
//! repulsion and Hookean attraction under a linearly cooled temperature
//! bound. Boundary ports pin attachment points onto an enclosing ellipse;
//! repulsion can be pruned with a sparse spatial grid.

mod grid;
mod place;
mod sim;

use std::sync::atomic::AtomicBool;

use grebe_graph::{EdgeId, NodeId};
use serde::Serialize;

use crate::LayoutGraph;
use crate::model::Point;

pub const DEFAULT_K: f64 = 0.3;
pub const DEFAULT_C: f64 = 1.2;
pub const DEFAULT_TFACT: f64 = 0.9;
pub const DEFAULT_MAX_ITER: usize = 600;

/// Separation margin applied around the boundary ellipse.
const EXPFACTOR: f64 = 1.2;

/// How initial placement randomness is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Seed {
    /// Seed from wall-clock entropy; layouts differ run to run.
    Random,
    /// Fixed seed; layouts are reproducible.
    Fixed(u64),
    /// Start from the nodes' own positions. Not supported by this engine:
    /// substituted with [`Seed::Random`] after a warning.
    SelfPlacement,
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Fixed(1)
    }
}

/// Per-call layout parameters. No state is shared between calls; nested
/// layouts each resolve their own temperature.
#[derive(Debug, Clone, Serialize)]
pub struct Params {
    /// Prune repulsion with a spatial grid instead of all pairs.
    pub use_grid: bool,
    /// Alternate force-law normalization.
    pub use_new: bool,
    /// Ideal edge length / spring constant.
    pub k: f64,
    /// Repulsion scale factor, reported through [`Schedule`] for callers that
    /// feed a follow-up expansion pass.
    pub c: f64,
    /// Initial temperature; derived from `tfact`, `k`, and the node count
    /// when absent.
    pub t0: Option<f64>,
    /// Scale applied when deriving the temperature.
    pub tfact: f64,
    /// Total iteration budget.
    pub max_iter: usize,
    /// Percentage of `max_iter` run as the unscaled first pass; 0 runs the
    /// whole budget in one pass.
    pub unscaled: u32,
    pub seed: Seed,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            use_grid: true,
            use_new: true,
            k: DEFAULT_K,
            c: DEFAULT_C,
            t0: None,
            tfact: DEFAULT_TFACT,
            max_iter: DEFAULT_MAX_ITER,
            unscaled: 0,
            seed: Seed::default(),
        }
    }
}

/// The schedule a layout call actually ran, for diagnostics and recursive
/// drivers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Schedule {
    pub t0: f64,
    pub k: f64,
    pub c: f64,
    pub num_iters: usize,
    pub loopcnt: usize,
}

/// A boundary port: a node pinned onto the enclosing ellipse at `angle`,
/// optionally carrying the external edge it anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortSpec {
    pub node: NodeId,
    pub edge: Option<EdgeId>,
    pub angle: f64,
}

/// Builds [`Params`] from the graph-level attributes (`maxiter`, `k`, `t0`,
/// `start`) over the documented defaults.
pub fn init_params(g: &LayoutGraph) -> Params {
    let lbl = g.graph();
    let mut p = Params::default();
    if let Some(maxiter) = lbl.maxiter {
        p.max_iter = maxiter;
    }
    if let Some(k) = lbl.k {
        p.k = k;
    }
    if let Some(t0) = lbl.t0 {
        p.t0 = Some(t0);
    }
    if let Some(start) = lbl.start.as_deref() {
        p.seed = match start.trim() {
            "random" => Seed::Random,
            "self" => Seed::SelfPlacement,
            s => match s.parse::<u64>() {
                Ok(n) => Seed::Fixed(n),
                Err(_) => {
                    tracing::warn!(start = s, "unrecognized start attribute; keeping default seed");
                    p.seed
                }
            },
        };
    }
    p
}

/// Runs one layout pass, mutating every node's `pos` in place. Port nodes are
/// held on the boundary ellipse; hard-pinned nodes are never moved. A set
/// `cancel` flag stops the iteration at the next cooling boundary.
pub fn layout(
    g: &mut LayoutGraph,
    ports: &[PortSpec],
    params: &Params,
    cancel: Option<&AtomicBool>,
) -> Schedule {
    let t0 = params
        .t0
        .unwrap_or_else(|| params.tfact * params.k * (g.node_count() as f64).sqrt() / 5.0);
    let num_iters = params.max_iter;
    let loopcnt = if params.unscaled > 0 {
        (params.unscaled.min(100) as usize) * num_iters / 100
    } else {
        num_iters
    };
    let schedule = Schedule {
        t0,
        k: params.k,
        c: params.c,
        num_iters,
        loopcnt,
    };

    let mut rng = match params.seed {
        Seed::Fixed(seed) => XorShift64Star::new(seed),
        Seed::Random => XorShift64Star::new(entropy_seed()),
        Seed::SelfPlacement => {
            tracing::warn!("\"self\" start mode is not supported by this engine; using a random start");
            XorShift64Star::new(entropy_seed())
        }
    };

    let placement = place::init_positions(g, ports, params.k, &mut rng);
    let ctr = placement.ctr;
    let mut sim = sim::Sim::new(g, placement, params, rng);
    sim.run(t0, num_iters, loopcnt, cancel);

    let ids: Vec<NodeId> = g.node_ids().collect();
    for v in ids {
        let p = sim.position(v.index());
        g.node_mut(v).pos = Some(Point::new(p.x + ctr.x, p.y + ctr.y));
    }
    schedule
}

fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
        | 1
}

/// Deterministic xorshift64* generator. Placement randomness and
/// degeneracy jitter must be reproducible under a fixed seed, so ambient
/// process randomness is never consulted.
#[derive(Debug, Clone)]
pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub(crate) fn next_f64_unit(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    /// Small displacement in `(-5, 5)` used to separate coincident points.
    pub(crate) fn jitter(&mut self) -> f64 {
        (self.next_f64_unit() - 0.5) * 10.0
    }
}
