//! The network simplex solver.
//!
//! All scratch state lives on [`Simplex`], indexed by the graph's node/edge
//! arenas: the spanning tree is parent-edge pointers plus per-node tree
//! adjacency sublists, and `low`/`lim` DFS interval bounds make subtree
//! membership an O(1) range test. Every traversal is iterative with an
//! explicit stack.

mod balance;
mod feasible;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::{Balance, RankError, RankStats, Result};
use crate::LayoutGraph;

pub(super) struct Simplex {
    n_nodes: usize,

    // Graph snapshot, insertion order preserved.
    tail: Vec<usize>,
    head: Vec<usize>,
    minlen: Vec<i32>,
    weight: Vec<f64>,
    out: Vec<Vec<usize>>,
    ins: Vec<Vec<usize>>,

    rank: Vec<i32>,
    feasible_at_start: bool,

    // Spanning-tree bookkeeping.
    mark: Vec<bool>,
    priority: Vec<usize>,
    low: Vec<i32>,
    lim: Vec<i32>,
    /// Parent tree edge of each node; the DFS root has none.
    par: Vec<Option<usize>>,
    cutvalue: Vec<f64>,
    /// Slot in `tree_edges`, or `None` for a non-tree edge.
    tree_index: Vec<Option<usize>>,
    tree_edges: Vec<usize>,
    tree_nodes: Vec<usize>,
    tree_in: Vec<Vec<usize>>,
    tree_out: Vec<Vec<usize>>,

    /// Round-robin position of the bounded leave-edge search.
    search_cursor: usize,
}

impl Simplex {
    pub(super) fn new(g: &LayoutGraph) -> Self {
        let n = g.node_count();
        let m = g.edge_count();

        let mut tail = Vec::with_capacity(m);
        let mut head = Vec::with_capacity(m);
        let mut minlen = Vec::with_capacity(m);
        let mut weight = Vec::with_capacity(m);
        for e in g.edge_ids() {
            let (t, h) = g.endpoints(e);
            let lbl = g.edge(e);
            tail.push(t.index());
            head.push(h.index());
            minlen.push(lbl.minlen.max(0));
            weight.push(lbl.weight.max(0.0));
        }

        let mut out = vec![Vec::new(); n];
        let mut ins = vec![Vec::new(); n];
        for v in g.node_ids() {
            out[v.index()] = g.out_edges(v).iter().map(|e| e.index()).collect();
            ins[v.index()] = g.in_edges(v).iter().map(|e| e.index()).collect();
        }

        let rank: Vec<i32> = g.node_ids().map(|v| g.node(v).rank.unwrap_or(0)).collect();
        let priority: Vec<usize> = (0..n).map(|v| ins[v].len()).collect();

        let mut s = Self {
            n_nodes: n,
            tail,
            head,
            minlen,
            weight,
            out,
            ins,
            rank,
            feasible_at_start: false,
            mark: vec![false; n],
            priority,
            low: vec![0; n],
            lim: vec![0; n],
            par: vec![None; n],
            cutvalue: vec![0.0; m],
            tree_index: vec![None; m],
            tree_edges: Vec::with_capacity(n.saturating_sub(1)),
            tree_nodes: Vec::with_capacity(n),
            tree_in: vec![Vec::new(); n],
            tree_out: vec![Vec::new(); n],
            search_cursor: 0,
        };
        s.feasible_at_start = (0..s.n_edges()).all(|e| s.slack(e) >= 0);
        s
    }

    fn n_edges(&self) -> usize {
        self.tail.len()
    }

    fn slack(&self, e: usize) -> i32 {
        self.rank[self.head[e]] - self.rank[self.tail[e]] - self.minlen[e]
    }

    fn is_tree_edge(&self, e: usize) -> bool {
        self.tree_index[e].is_some()
    }

    /// `true` when `lim(w)` falls inside the DFS interval of `v`'s subtree.
    fn in_subtree(&self, v: usize, w: usize) -> bool {
        self.low[v] <= self.lim[w] && self.lim[w] <= self.lim[v]
    }

    fn other_end(&self, e: usize, v: usize) -> usize {
        if self.tail[e] == v {
            self.head[e]
        } else {
            self.tail[e]
        }
    }

    pub(super) fn solve(
        &mut self,
        balance: Balance,
        max_iter: i32,
        search_size: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<RankStats> {
        if !self.feasible_at_start {
            self.init_rank();
        }

        if max_iter <= 0 {
            // Initial feasible assignment only; no tight tree is built, so
            // the tree-walking balance mode degrades to normalization.
            match balance {
                Balance::TopBottom => self.tb_balance(),
                _ => {
                    self.normalize();
                }
            }
            return Ok(RankStats { pivots: 0 });
        }

        self.feasible_tree()?;
        #[cfg(debug_assertions)]
        self.check_cutvalues()?;

        let start = Instant::now();
        let max_iter = max_iter as usize;
        let mut pivots = 0usize;
        loop {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                tracing::debug!(pivots, "network simplex cancelled");
                break;
            }
            let Some(e) = self.leave_edge(search_size) else {
                break;
            };
            let f = self
                .enter_edge(e)
                .ok_or(RankError::Internal("no entering edge for a leave edge"))?;
            self.update(e, f)?;
            #[cfg(debug_assertions)]
            self.check_cutvalues()?;
            pivots += 1;
            if pivots % 100 == 0 {
                tracing::debug!(pivots, elapsed = ?start.elapsed(), "network simplex progress");
            }
            if pivots >= max_iter {
                break;
            }
        }

        match balance {
            Balance::TopBottom => self.tb_balance(),
            Balance::LeftRight => self.lr_balance(),
            Balance::None => {
                self.normalize();
            }
        }

        tracing::debug!(
            nodes = self.n_nodes,
            edges = self.n_edges(),
            pivots,
            elapsed = ?start.elapsed(),
            "network simplex done"
        );
        Ok(RankStats { pivots })
    }

    pub(super) fn store_ranks(&self, g: &mut LayoutGraph) {
        let ids: Vec<grebe_graph::NodeId> = g.node_ids().collect();
        for v in ids {
            g.node_mut(v).rank = Some(self.rank[v.index()]);
        }
    }

    // --- cut values ---------------------------------------------------------

    /// Assigns `low`/`lim`/`par` over the subtree rooted at `root`, then
    /// recomputes every tree edge's cut value bottom-up.
    fn init_cutvalues(&mut self) {
        if self.n_nodes == 0 {
            return;
        }
        self.dfs_range(0, None, 1);

        // Reverse preorder visits children before parents.
        let order = self.tree_preorder(0);
        for &v in order.iter().rev() {
            if let Some(f) = self.par[v] {
                self.cutvalue[f] = self.compute_cutvalue(f, v);
            }
        }
    }

    fn tree_preorder(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.tree_nodes.len());
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            order.push(v);
            for &e in self.tree_out[v].iter().chain(&self.tree_in[v]) {
                if Some(e) != self.par[v] {
                    stack.push(self.other_end(e, v));
                }
            }
        }
        order
    }

    /// Cut value of tree edge `f` whose already-searched endpoint is `v`
    /// (`par[v] == f`): the signed weight sum of every edge incident to `v`,
    /// where edges leaving the subtree contribute their raw weight and edges
    /// staying inside contribute their child cut value minus their own weight,
    /// with signs flipped by direction relative to `f`.
    fn compute_cutvalue(&self, f: usize, v: usize) -> f64 {
        let dir_down = self.tail[f] == v;
        let mut sum = 0.0;
        for &e in self.out[v].iter().chain(&self.ins[v]) {
            sum += self.cut_contribution(e, v, dir_down);
        }
        sum
    }

    fn cut_contribution(&self, e: usize, v: usize, dir_down: bool) -> f64 {
        let other = self.other_end(e, v);
        let crosses = !self.in_subtree(v, other);
        let mut rv = if crosses {
            self.weight[e]
        } else {
            let inner = if self.is_tree_edge(e) {
                self.cutvalue[e]
            } else {
                0.0
            };
            inner - self.weight[e]
        };

        let mut d = if dir_down {
            self.head[e] == v
        } else {
            self.tail[e] == v
        };
        if crosses {
            d = !d;
        }
        if !d {
            rv = -rv;
        }
        rv
    }

    /// Iterative DFS numbering: `low(v)` is the counter value on first visit,
    /// `lim(v)` the postorder value, so a subtree occupies `[low, lim]`.
    fn dfs_range(&mut self, root: usize, par: Option<usize>, low: i32) {
        struct Frame {
            v: usize,
            par: Option<usize>,
            low: i32,
            next: usize,
        }

        let mut next_lim = low;
        self.par[root] = par;
        let mut stack = vec![Frame {
            v: root,
            par,
            low,
            next: 0,
        }];

        loop {
            let next = {
                let Some(top) = stack.last_mut() else {
                    break;
                };
                let v = top.v;
                let n_out = self.tree_out[v].len();
                let e = if top.next < n_out {
                    Some(self.tree_out[v][top.next])
                } else {
                    self.tree_in[v].get(top.next - n_out).copied()
                };
                if e.is_some() {
                    top.next += 1;
                }
                (v, top.par, e)
            };

            match next {
                (v, frame_par, Some(e)) => {
                    if Some(e) == frame_par {
                        continue;
                    }
                    let w = self.other_end(e, v);
                    self.par[w] = Some(e);
                    stack.push(Frame {
                        v: w,
                        par: Some(e),
                        low: next_lim,
                        next: 0,
                    });
                }
                (_, _, None) => {
                    let Some(frame) = stack.pop() else {
                        break;
                    };
                    self.low[frame.v] = frame.low;
                    self.lim[frame.v] = next_lim;
                    next_lim += 1;
                }
            }
        }
    }

    // --- pivoting -----------------------------------------------------------

    /// Round-robin search for a tree edge with negative cut value, bounded by
    /// `search_size` candidates per call; returns the most negative seen.
    fn leave_edge(&mut self, search_size: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut seen = 0usize;
        let wrap = self.search_cursor;

        while self.search_cursor < self.tree_edges.len() {
            let f = self.tree_edges[self.search_cursor];
            if self.cutvalue[f] < 0.0 {
                best = Some(match best {
                    Some(b) if self.cutvalue[b] <= self.cutvalue[f] => b,
                    _ => f,
                });
                seen += 1;
                if seen >= search_size {
                    return best;
                }
            }
            self.search_cursor += 1;
        }
        if wrap > 0 {
            self.search_cursor = 0;
            while self.search_cursor < wrap {
                let f = self.tree_edges[self.search_cursor];
                if self.cutvalue[f] < 0.0 {
                    best = Some(match best {
                        Some(b) if self.cutvalue[b] <= self.cutvalue[f] => b,
                        _ => f,
                    });
                    seen += 1;
                    if seen >= search_size {
                        return best;
                    }
                }
                self.search_cursor += 1;
            }
        }
        best
    }

    /// Minimum-slack non-tree edge crossing the cut of `e` against its
    /// direction, found by walking only the smaller side of the tree.
    fn enter_edge(&self, e: usize) -> Option<usize> {
        let (t, h) = (self.tail[e], self.head[e]);
        // The endpoint with the smaller lim roots the cut-off subtree.
        let (v, outsearch) = if self.lim[t] < self.lim[h] {
            (t, false)
        } else {
            (h, true)
        };
        let low = self.low[v];
        let lim = self.lim[v];

        let mut best: Option<usize> = None;
        let mut best_slack = i32::MAX;
        let mut stack = vec![v];

        while let Some(v) = stack.pop() {
            let (cands, tree_cont) = if outsearch {
                (&self.out[v], &self.tree_in[v])
            } else {
                (&self.ins[v], &self.tree_out[v])
            };

            for &e in cands {
                let far = if outsearch { self.head[e] } else { self.tail[e] };
                if !self.is_tree_edge(e) {
                    if !(low <= self.lim[far] && self.lim[far] <= lim) {
                        let slack = self.slack(e);
                        if slack < best_slack {
                            best_slack = slack;
                            best = Some(e);
                        }
                    }
                } else if self.lim[far] < self.lim[v] {
                    stack.push(far);
                }
            }
            for &e in tree_cont {
                if best_slack <= 0 {
                    break;
                }
                let far = if outsearch { self.tail[e] } else { self.head[e] };
                if self.lim[far] < self.lim[v] {
                    stack.push(far);
                }
            }
        }
        best
    }

    /// Exchanges leaving tree edge `e` for entering edge `f`: re-ranks the
    /// smaller side by `f`'s slack, propagates `e`'s cut value along the tree
    /// path between `f`'s endpoints, swaps the edges, and renumbers from the
    /// LCA down.
    fn update(&mut self, e: usize, f: usize) -> Result<()> {
        let delta = self.slack(f);
        if delta > 0 {
            let (t, h) = (self.tail[e], self.head[e]);
            let t_degree = self.tree_in[t].len() + self.tree_out[t].len();
            if t_degree == 1 {
                self.rerank(t, delta, e);
            } else {
                let h_degree = self.tree_in[h].len() + self.tree_out[h].len();
                if h_degree == 1 {
                    self.rerank(h, -delta, e);
                } else if self.lim[t] < self.lim[h] {
                    self.rerank(t, delta, e);
                } else {
                    self.rerank(h, -delta, e);
                }
            }
        }

        let cutvalue = self.cutvalue[e];
        let lca = self.tree_path_update(self.tail[f], self.head[f], cutvalue, true)?;
        if self.tree_path_update(self.head[f], self.tail[f], cutvalue, false)? != lca {
            return Err(RankError::Internal("mismatched lca in tree path updates"));
        }
        self.cutvalue[f] = -cutvalue;
        self.cutvalue[e] = 0.0;
        self.exchange_tree_edges(e, f)?;
        self.dfs_range(lca, self.par[lca], self.low[lca]);
        Ok(())
    }

    /// Walks parent edges from `v` until `w` is inside `v`'s subtree (their
    /// LCA), adding or subtracting `cutvalue` on each edge by traversal
    /// direction. Returns the LCA.
    fn tree_path_update(
        &mut self,
        mut v: usize,
        w: usize,
        cutvalue: f64,
        dir: bool,
    ) -> Result<usize> {
        while !self.in_subtree(v, w) {
            let e = self
                .par[v]
                .ok_or(RankError::Internal("tree path walked past the root"))?;
            let d = if self.tail[e] == v { dir } else { !dir };
            if d {
                self.cutvalue[e] += cutvalue;
            } else {
                self.cutvalue[e] -= cutvalue;
            }
            v = if self.lim[self.tail[e]] > self.lim[self.head[e]] {
                self.tail[e]
            } else {
                self.head[e]
            };
        }
        Ok(v)
    }

    /// Shifts every node on `root`'s side of the tree minus `removed` down by
    /// `delta` ranks. The walk never crosses `removed` or the edge it arrived
    /// through, so it covers exactly one side of the cut.
    fn rerank(&mut self, root: usize, delta: i32, removed: usize) {
        let mut stack: Vec<(usize, Option<usize>)> = vec![(root, None)];
        while let Some((v, via)) = stack.pop() {
            self.rank[v] -= delta;
            let n_out = self.tree_out[v].len();
            for i in 0..n_out + self.tree_in[v].len() {
                let e = if i < n_out {
                    self.tree_out[v][i]
                } else {
                    self.tree_in[v][i - n_out]
                };
                if e != removed && Some(e) != via {
                    stack.push((self.other_end(e, v), Some(e)));
                }
            }
        }
    }

    fn exchange_tree_edges(&mut self, e: usize, f: usize) -> Result<()> {
        let slot = self
            .tree_index[e]
            .ok_or(RankError::Internal("leaving edge is not in the tree"))?;
        self.tree_index[f] = Some(slot);
        self.tree_edges[slot] = f;
        self.tree_index[e] = None;

        Self::remove_adjacent(&mut self.tree_out[self.tail[e]], e)?;
        Self::remove_adjacent(&mut self.tree_in[self.head[e]], e)?;
        self.tree_out[self.tail[f]].push(f);
        self.tree_in[self.head[f]].push(f);
        Ok(())
    }

    fn remove_adjacent(list: &mut Vec<usize>, e: usize) -> Result<()> {
        let pos = list
            .iter()
            .position(|&x| x == e)
            .ok_or(RankError::Internal("tree adjacency list missing an edge"))?;
        list.swap_remove(pos);
        Ok(())
    }

    // --- consistency --------------------------------------------------------

    /// Recomputes every tree edge's cut value from the partition definition
    /// and compares against the incrementally maintained values. Debug builds
    /// run this after every tree rebuild; valid input must never trip it.
    #[cfg(debug_assertions)]
    fn check_cutvalues(&self) -> Result<()> {
        for &f in &self.tree_edges {
            let child = if self.par[self.tail[f]] == Some(f) {
                self.tail[f]
            } else if self.par[self.head[f]] == Some(f) {
                self.head[f]
            } else {
                return Err(RankError::Internal("tree edge not on any parent path"));
            };
            let child_is_tail = child == self.tail[f];

            let mut expect = 0.0;
            for e in 0..self.n_edges() {
                let tail_inside = self.in_subtree(child, self.tail[e]);
                let head_inside = self.in_subtree(child, self.head[e]);
                if tail_inside == head_inside {
                    continue;
                }
                // Crossing edge: positive when it points the same way as `f`.
                let same_dir = tail_inside == child_is_tail;
                if same_dir {
                    expect += self.weight[e];
                } else {
                    expect -= self.weight[e];
                }
            }
            if (expect - self.cutvalue[f]).abs() > 1e-6 {
                return Err(RankError::Internal("cut value cross-check mismatch"));
            }
        }
        Ok(())
    }
}
