//! Initial feasible ranking and the tight spanning tree.

use std::collections::VecDeque;

use super::Simplex;
use crate::rank::{RankError, Result};

impl Simplex {
    /// Topological relaxation: process nodes in in-degree-zero order, placing
    /// each at the lowest rank its in-edges allow. Guarantees feasibility, not
    /// tightness.
    pub(super) fn init_rank(&mut self) {
        let mut queue: VecDeque<usize> =
            (0..self.n_nodes).filter(|&v| self.priority[v] == 0).collect();
        let mut processed = 0usize;

        while let Some(v) = queue.pop_front() {
            processed += 1;
            let mut rank = 0;
            for &e in &self.ins[v] {
                rank = rank.max(self.rank[self.tail[e]] + self.minlen[e]);
            }
            self.rank[v] = rank;
            for i in 0..self.out[v].len() {
                let h = self.head[self.out[v][i]];
                self.priority[h] -= 1;
                if self.priority[h] == 0 {
                    queue.push_back(h);
                }
            }
        }

        if processed != self.n_nodes {
            tracing::warn!(
                processed,
                nodes = self.n_nodes,
                "could not rank every node; the input graph likely contains a cycle"
            );
        }
    }

    /// Grows a tight tree until it spans the graph, shifting the tree's ranks
    /// by the minimum incident slack whenever growth stalls, then computes the
    /// initial cut values.
    pub(super) fn feasible_tree(&mut self) -> Result<()> {
        if self.n_nodes <= 1 {
            return Ok(());
        }

        loop {
            let spanned = self.tight_tree();
            if spanned >= self.n_nodes {
                break;
            }
            let Some(e) = self.min_slack_incident_edge() else {
                return Err(RankError::Infeasible {
                    spanned,
                    total: self.n_nodes,
                });
            };
            let mut delta = self.slack(e);
            if delta != 0 {
                if self.mark[self.head[e]] {
                    delta = -delta;
                }
                for i in 0..self.tree_nodes.len() {
                    self.rank[self.tree_nodes[i]] += delta;
                }
            }
        }

        self.init_cutvalues();
        Ok(())
    }

    /// Rebuilds the maximal tight subtree reachable from the first node.
    /// Returns how many nodes it touches.
    pub(super) fn tight_tree(&mut self) -> usize {
        self.mark.fill(false);
        for v in 0..self.n_nodes {
            self.tree_in[v].clear();
            self.tree_out[v].clear();
        }
        self.tree_index.fill(None);
        self.tree_edges.clear();
        self.tree_nodes.clear();
        if self.n_nodes == 0 {
            return 0;
        }

        self.mark[0] = true;
        self.tree_nodes.push(0);
        let mut stack = vec![0usize];
        while let Some(v) = stack.pop() {
            let n_out = self.out[v].len();
            for i in 0..n_out + self.ins[v].len() {
                let e = if i < n_out {
                    self.out[v][i]
                } else {
                    self.ins[v][i - n_out]
                };
                if self.is_tree_edge(e) {
                    continue;
                }
                let w = self.other_end(e, v);
                if !self.mark[w] && self.slack(e) == 0 {
                    self.add_tree_edge(e);
                    stack.push(w);
                }
            }
        }
        self.tree_nodes.len()
    }

    fn add_tree_edge(&mut self, e: usize) {
        debug_assert!(!self.is_tree_edge(e));
        self.tree_index[e] = Some(self.tree_edges.len());
        self.tree_edges.push(e);
        for v in [self.tail[e], self.head[e]] {
            if !self.mark[v] {
                self.mark[v] = true;
                self.tree_nodes.push(v);
            }
        }
        self.tree_out[self.tail[e]].push(e);
        self.tree_in[self.head[e]].push(e);
    }

    /// Non-tree edge with exactly one endpoint in the tree and minimal slack.
    fn min_slack_incident_edge(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for e in 0..self.n_edges() {
            if self.is_tree_edge(e) {
                continue;
            }
            if self.mark[self.tail[e]] == self.mark[self.head[e]] {
                continue;
            }
            match best {
                Some(b) if self.slack(e) >= self.slack(b) => {}
                _ => best = Some(e),
            }
        }
        best
    }
}
