//! Rank assignment via network simplex.
//!
//! Assigns an integer rank to every node of a directed acyclic graph,
//! minimizing `sum(weight(e) * (rank(head) - rank(tail)))` subject to
//! `rank(head) - rank(tail) >= minlen(e)` for every edge. The solver builds a
//! spanning tree of tight edges, then repeatedly exchanges a tree edge with
//! negative cut value for a minimum-slack non-tree edge until no improving
//! pivot remains.

mod simplex;

use std::sync::atomic::AtomicBool;

use grebe_graph::{NodeId, alg};

use crate::{LayoutGraph, util};

/// Default bound on how many negative-cut-value candidates one round-robin
/// leave-edge search inspects before pivoting on the best so far.
pub const DEFAULT_SEARCH_SIZE: usize = 30;

/// Post-optimization balancing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Balance {
    /// No balancing; the minimum rank is normalized to 0.
    #[default]
    None,
    /// Move nodes with equal in/out edge weight to the least-populated
    /// feasible rank.
    TopBottom,
    /// Shift subtrees hanging off zero-cut-value tree edges by half their
    /// slack.
    LeftRight,
}

/// What a successful ranking run actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RankStats {
    /// Number of simplex pivots performed. Re-running on an already-optimal
    /// ranking reports 0.
    pub pivots: usize,
}

impl RankStats {
    fn merge(self, other: RankStats) -> RankStats {
        RankStats {
            pivots: self.pivots + other.pivots,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// The tight tree cannot span all nodes: the constraints are
    /// over-constrained or the graph is not connected through its edges.
    /// Recoverable; the caller may keep the initial feasible ranking or
    /// reject the input.
    #[error("ranking constraints are infeasible: a tight tree spans only {spanned} of {total} nodes")]
    Infeasible { spanned: usize, total: usize },

    /// The solver's own bookkeeping failed a consistency check. This is a bug
    /// in the engine, never a property of the input; it must not be swallowed.
    #[error("internal ranking invariant violated: {0}")]
    Internal(&'static str),
}

pub type Result<T> = std::result::Result<T, RankError>;

/// Ranks `g`, mutating each node's `rank`.
///
/// Parallel edges are merged (weights summed, minlen maximized) and each
/// weakly-connected component is ranked independently with its minimum rank
/// normalized per [`Balance`]. The pivot-search window is read from
/// `GraphLabel::searchsize` (default [`DEFAULT_SEARCH_SIZE`]).
///
/// `max_iter` bounds the pivot count; when `max_iter <= 0` only the initial
/// feasible assignment is produced. A set `cancel` flag stops pivoting at the
/// next iteration boundary, keeping the current feasible ranking.
pub fn rank(
    g: &mut LayoutGraph,
    balance: Balance,
    max_iter: i32,
    cancel: Option<&AtomicBool>,
) -> Result<RankStats> {
    let search_size = g.graph().searchsize.unwrap_or(DEFAULT_SEARCH_SIZE);
    let mut simplified = util::simplify(g);
    let components = alg::weak_components(&simplified);
    let mut stats = RankStats::default();

    if components.len() <= 1 {
        stats = rank2(&mut simplified, balance, max_iter, search_size, cancel)?;
    } else {
        for comp in &components {
            stats = stats.merge(rank_component(
                &mut simplified,
                comp,
                balance,
                max_iter,
                search_size,
                cancel,
            )?);
        }
    }

    let ids: Vec<NodeId> = g.node_ids().collect();
    for v in ids {
        g.node_mut(v).rank = simplified.node(v).rank;
    }
    Ok(stats)
}

/// The single-component core: ranks `g` in place with an explicit pivot-search
/// window. Returns [`RankError::Infeasible`] when the tight tree cannot span
/// `g`'s nodes, which for valid constraints means `g` is disconnected.
pub fn rank2(
    g: &mut LayoutGraph,
    balance: Balance,
    max_iter: i32,
    search_size: usize,
    cancel: Option<&AtomicBool>,
) -> Result<RankStats> {
    let mut s = simplex::Simplex::new(g);
    let stats = s.solve(balance, max_iter, search_size, cancel)?;
    s.store_ranks(g);
    Ok(stats)
}

fn rank_component(
    g: &mut LayoutGraph,
    comp: &[NodeId],
    balance: Balance,
    max_iter: i32,
    search_size: usize,
    cancel: Option<&AtomicBool>,
) -> Result<RankStats> {
    let mut local = LayoutGraph::new(g.graph().clone());
    let mut local_of: Vec<Option<NodeId>> = vec![None; g.node_count()];
    let mut ids: Vec<NodeId> = Vec::with_capacity(comp.len());
    for &v in comp {
        let id = local.add_node(g.node(v).clone());
        local_of[v.index()] = Some(id);
        ids.push(id);
    }
    for e in g.edge_ids() {
        let (t, h) = g.endpoints(e);
        if let (Some(lt), Some(lh)) = (local_of[t.index()], local_of[h.index()]) {
            local.add_edge(lt, lh, g.edge(e).clone());
        }
    }

    let stats = rank2(&mut local, balance, max_iter, search_size, cancel)?;

    for (&v, &id) in comp.iter().zip(&ids) {
        g.node_mut(v).rank = local.node(id).rank;
    }
    Ok(stats)
}
