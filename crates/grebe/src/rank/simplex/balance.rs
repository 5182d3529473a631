//! Post-optimization balancing passes.

use super::Simplex;

impl Simplex {
    /// Shifts ranks so the minimum becomes 0; returns the maximum rank.
    pub(super) fn normalize(&mut self) -> i32 {
        let Some(&min) = self.rank.iter().min() else {
            return 0;
        };
        if min != 0 {
            for r in &mut self.rank {
                *r -= min;
            }
        }
        self.rank.iter().copied().max().unwrap_or(0)
    }

    /// Moves every node whose in- and out-edge weights balance to the least
    /// populated rank its neighbors allow. Improves vertical spread without
    /// changing the total cost.
    pub(super) fn tb_balance(&mut self) {
        let max_rank = self.normalize();
        let mut nrank = vec![0usize; max_rank as usize + 1];
        for &r in &self.rank {
            nrank[r as usize] += 1;
        }

        for v in 0..self.n_nodes {
            let mut in_weight = 0.0;
            let mut out_weight = 0.0;
            let mut low = 0i32;
            let mut high = max_rank;
            for &e in &self.ins[v] {
                in_weight += self.weight[e];
                low = low.max(self.rank[self.tail[e]] + self.minlen[e]);
            }
            for &e in &self.out[v] {
                out_weight += self.weight[e];
                high = high.min(self.rank[self.head[e]] - self.minlen[e]);
            }
            if low < 0 {
                low = 0;
            }
            if in_weight == out_weight && low < high {
                let mut choice = low;
                for i in low + 1..=high {
                    if nrank[i as usize] < nrank[choice as usize] {
                        choice = i;
                    }
                }
                nrank[self.rank[v] as usize] -= 1;
                nrank[choice as usize] += 1;
                self.rank[v] = choice;
            }
        }
    }

    /// Centers the subtrees hanging off zero-cut-value tree edges by half the
    /// slack of their best alternative edge.
    pub(super) fn lr_balance(&mut self) {
        for i in 0..self.tree_edges.len() {
            let e = self.tree_edges[i];
            if self.cutvalue[e] != 0.0 {
                continue;
            }
            let Some(f) = self.enter_edge(e) else {
                continue;
            };
            let delta = self.slack(f);
            if delta <= 1 {
                continue;
            }
            if self.lim[self.tail[e]] < self.lim[self.head[e]] {
                self.rerank(self.tail[e], delta / 2, e);
            } else {
                self.rerank(self.head[e], -(delta / 2), e);
            }
        }
    }
}
