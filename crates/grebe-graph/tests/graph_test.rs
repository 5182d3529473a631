use grebe_graph::{Digraph, alg};

fn chain(n: usize) -> Digraph<(), (), ()> {
    let mut g: Digraph<(), (), ()> = Digraph::default();
    let ids: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
    for w in ids.windows(2) {
        g.add_edge(w[0], w[1], ());
    }
    g
}

#[test]
fn adjacency_tracks_insertion_order() {
    let mut g: Digraph<&str, u32, ()> = Digraph::default();
    let a = g.add_node("a");
    let b = g.add_node("b");
    let c = g.add_node("c");

    let ab = g.add_edge(a, b, 1);
    let ac = g.add_edge(a, c, 2);
    let cb = g.add_edge(c, b, 3);

    assert_eq!(g.out_edges(a), &[ab, ac]);
    assert_eq!(g.in_edges(b), &[ab, cb]);
    assert_eq!(g.endpoints(ac), (a, c));
    assert_eq!(*g.edge(cb), 3);
    assert_eq!(*g.node(c), "c");
}

#[test]
fn parallel_edges_are_distinct() {
    let mut g: Digraph<(), u32, ()> = Digraph::default();
    let a = g.add_node(());
    let b = g.add_node(());
    let e1 = g.add_edge(a, b, 1);
    let e2 = g.add_edge(a, b, 2);
    assert_ne!(e1, e2);
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.out_edges(a).len(), 2);
}

#[test]
fn labels_are_mutable_in_place() {
    let mut g: Digraph<i32, i32, i32> = Digraph::new(7);
    let a = g.add_node(1);
    let b = g.add_node(2);
    let e = g.add_edge(a, b, 3);

    *g.node_mut(a) += 10;
    *g.edge_mut(e) += 10;
    *g.graph_mut() += 10;

    assert_eq!(*g.node(a), 11);
    assert_eq!(*g.edge(e), 13);
    assert_eq!(*g.graph(), 17);
}

#[test]
fn weak_components_of_a_connected_chain() {
    let g = chain(5);
    let comps = alg::weak_components(&g);
    assert_eq!(comps.len(), 1);
    assert_eq!(comps[0].len(), 5);
}

#[test]
fn weak_components_ignore_edge_direction() {
    let mut g: Digraph<(), (), ()> = Digraph::default();
    let a = g.add_node(());
    let b = g.add_node(());
    let c = g.add_node(());
    // b -> a keeps {a, b} weakly connected even though a has no out-edges.
    g.add_edge(b, a, ());

    let comps = alg::weak_components(&g);
    assert_eq!(comps.len(), 2);
    assert_eq!(comps[0], vec![a, b]);
    assert_eq!(comps[1], vec![c]);
}

#[test]
fn weak_components_on_empty_graph() {
    let g: Digraph<(), (), ()> = Digraph::default();
    assert!(alg::weak_components(&g).is_empty());
}
