//! Graph algorithms that belong to the container rather than a layout engine.

use crate::{Digraph, NodeId};

/// Weakly-connected components, each in node insertion order, components
/// ordered by their lowest member.
pub fn weak_components<N, E, G>(g: &Digraph<N, E, G>) -> Vec<Vec<NodeId>> {
    let n = g.node_count();
    let mut component: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<NodeId>> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();

    for start in g.node_ids() {
        if component[start.index()].is_some() {
            continue;
        }
        let cx = components.len();
        components.push(Vec::new());
        component[start.index()] = Some(cx);
        stack.push(start);

        while let Some(v) = stack.pop() {
            components[cx].push(v);
            for &e in g.out_edges(v) {
                let w = g.head(e);
                if component[w.index()].is_none() {
                    component[w.index()] = Some(cx);
                    stack.push(w);
                }
            }
            for &e in g.in_edges(v) {
                let w = g.tail(e);
                if component[w.index()].is_none() {
                    component[w.index()] = Some(cx);
                    stack.push(w);
                }
            }
        }
        components[cx].sort();
    }

    components
}
