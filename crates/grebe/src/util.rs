//! Graph-rewriting helpers shared by the engines' entry points.

use crate::LayoutGraph;
use crate::model::EdgeLabel;
use rustc_hash::FxHashMap;

/// Collapses parallel edges into one edge per `(tail, head)` pair, summing
/// weights and keeping the largest `minlen`. Node labels are cloned; the
/// result has the same node ids as the input.
pub fn simplify(g: &LayoutGraph) -> LayoutGraph {
    let mut simplified = LayoutGraph::new(g.graph().clone());
    for v in g.node_ids() {
        simplified.add_node(g.node(v).clone());
    }

    // Merged labels in first-seen order; the map only deduplicates.
    let mut merged: Vec<(grebe_graph::NodeId, grebe_graph::NodeId, EdgeLabel)> = Vec::new();
    let mut slot_by_pair: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for e in g.edge_ids() {
        let (tail, head) = g.endpoints(e);
        let lbl = g.edge(e);
        match slot_by_pair.entry((tail.index(), head.index())) {
            std::collections::hash_map::Entry::Occupied(slot) => {
                let acc = &mut merged[*slot.get()].2;
                acc.weight += lbl.weight;
                acc.minlen = acc.minlen.max(lbl.minlen);
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push((tail, head, lbl.clone()));
            }
        }
    }

    for (tail, head, lbl) in merged {
        simplified.add_edge(tail, head, lbl);
    }
    simplified
}

/// Shifts ranks so the smallest assigned rank becomes 0. Nodes without a rank
/// are left untouched.
pub fn normalize_ranks(g: &mut LayoutGraph) {
    let mut min_rank = i32::MAX;
    for v in g.node_ids() {
        if let Some(rank) = g.node(v).rank {
            min_rank = min_rank.min(rank);
        }
    }
    if min_rank == i32::MAX {
        return;
    }
    let node_ids: Vec<_> = g.node_ids().collect();
    for v in node_ids {
        if let Some(rank) = g.node(v).rank {
            g.node_mut(v).rank = Some(rank - min_rank);
        }
    }
}
