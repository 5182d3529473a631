use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::atomic::AtomicBool;

use grebe::force::{self, Params, PortSpec, Seed};
use grebe::graph::NodeId;
use grebe::{EdgeLabel, LayoutGraph, NodeLabel, Pinned, Point};

fn spring_edge(weight: f64, len: Option<f64>) -> EdgeLabel {
    EdgeLabel {
        minlen: 1,
        weight,
        len,
    }
}

fn positions(g: &LayoutGraph, ids: &[NodeId]) -> Vec<Point> {
    ids.iter().map(|&v| g.node(v).pos.unwrap()).collect()
}

fn two_node_graph() -> (LayoutGraph, Vec<NodeId>) {
    let mut g = LayoutGraph::default();
    let a = g.add_node(NodeLabel::default());
    let b = g.add_node(NodeLabel::default());
    g.add_edge(a, b, spring_edge(1.0, Some(1.0)));
    (g, vec![a, b])
}

fn two_node_params(use_grid: bool) -> Params {
    Params {
        use_grid,
        // The classic force law settles exactly at the ideal length.
        use_new: false,
        k: 1.0,
        max_iter: 200,
        seed: Seed::Fixed(42),
        ..Params::default()
    }
}

#[test]
fn an_edge_converges_to_its_ideal_length() {
    let (mut g, ids) = two_node_graph();
    force::layout(&mut g, &[], &two_node_params(false), None);
    let p = positions(&g, &ids);
    let d = p[0].dist(p[1]);
    assert!((d - 1.0).abs() < 0.1, "distance {d} not near ideal length 1");
}

#[test]
fn grid_and_all_pairs_paths_agree_on_the_equilibrium() {
    let (mut g, ids) = two_node_graph();
    force::layout(&mut g, &[], &two_node_params(true), None);
    let p = positions(&g, &ids);
    let d = p[0].dist(p[1]);
    assert!((d - 1.0).abs() < 0.1, "grid path distance {d} off equilibrium");
}

#[test]
fn four_ports_stay_pinned_on_the_ellipse() {
    let mut g = LayoutGraph::default();
    let ids: Vec<NodeId> = (0..4).map(|_| g.add_node(NodeLabel::default())).collect();
    let angles = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
    let ports: Vec<PortSpec> = ids
        .iter()
        .zip(angles)
        .map(|(&node, angle)| PortSpec {
            node,
            edge: None,
            angle,
        })
        .collect();

    let params = Params {
        max_iter: 50,
        seed: Seed::Fixed(7),
        ..Params::default()
    };
    let schedule = force::layout(&mut g, &ports, &params, None);
    assert!(schedule.t0 > 0.0);

    // With no interior nodes the symmetric port repulsion is purely radial:
    // the projection returns each port to its assigned angle exactly.
    let wd = 1.2 * params.k * 2.0; // EXPFACTOR * k * sqrt(4)
    for (&v, angle) in ids.iter().zip(angles) {
        let p = g.node(v).pos.unwrap();
        assert!((p.x - wd * angle.cos()).abs() < 1e-9, "port x drifted: {p:?}");
        assert!((p.y - wd * angle.sin()).abs() < 1e-9, "port y drifted: {p:?}");
        let radius = (p.x / wd).powi(2) + (p.y / wd).powi(2);
        assert!((radius - 1.0).abs() < 1e-9);
    }
}

#[test]
fn interior_nodes_stay_inside_the_ellipse() {
    let mut g = LayoutGraph::default();
    let ids: Vec<NodeId> = (0..8).map(|_| g.add_node(NodeLabel::default())).collect();
    for w in ids.windows(2) {
        g.add_edge(w[0], w[1], spring_edge(1.0, None));
    }
    let ports = [
        PortSpec {
            node: ids[0],
            edge: None,
            angle: 0.0,
        },
        PortSpec {
            node: ids[7],
            edge: None,
            angle: PI,
        },
        PortSpec {
            node: ids[3],
            edge: None,
            angle: FRAC_PI_2,
        },
    ];
    let params = Params {
        k: 1.0,
        max_iter: 100,
        seed: Seed::Fixed(11),
        ..Params::default()
    };
    force::layout(&mut g, &ports, &params, None);

    let wd = 1.2 * 1.0 * (8f64).sqrt();
    let port_nodes = [ids[0], ids[7], ids[3]];
    for &v in &ids {
        let p = g.node(v).pos.unwrap();
        let radius = ((p.x / wd).powi(2) + (p.y / wd).powi(2)).sqrt();
        if port_nodes.contains(&v) {
            assert!((radius - 1.0).abs() < 1e-9, "port off boundary: {radius}");
        } else {
            assert!(radius <= 1.0 + 1e-9, "interior node escaped: {radius}");
        }
    }
}

#[test]
fn zero_temperature_moves_nothing() {
    let mut g = LayoutGraph::default();
    let given = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 1.0),
        Point::new(-1.0, 3.0),
    ];
    let ids: Vec<NodeId> = given
        .iter()
        .map(|&p| {
            g.add_node(NodeLabel {
                pos: Some(p),
                pinned: Pinned::Position,
                ..NodeLabel::default()
            })
        })
        .collect();
    g.add_edge(ids[0], ids[1], spring_edge(1.0, None));
    g.add_edge(ids[1], ids[2], spring_edge(1.0, None));

    let params = Params {
        t0: Some(0.0),
        seed: Seed::Fixed(1),
        ..Params::default()
    };
    force::layout(&mut g, &[], &params, None);

    for (&v, &expected) in ids.iter().zip(&given) {
        let p = g.node(v).pos.unwrap();
        assert!((p.x - expected.x).abs() < 1e-9);
        assert!((p.y - expected.y).abs() < 1e-9);
    }
}

#[test]
fn hard_pinned_nodes_never_move() {
    let mut g = LayoutGraph::default();
    let anchor = g.add_node(NodeLabel {
        pos: Some(Point::new(3.0, -2.0)),
        pinned: Pinned::Fixed,
        ..NodeLabel::default()
    });
    let free = g.add_node(NodeLabel::default());
    g.add_edge(anchor, free, spring_edge(1.0, None));

    let params = Params {
        max_iter: 80,
        seed: Seed::Fixed(3),
        ..Params::default()
    };
    force::layout(&mut g, &[], &params, None);

    let p = g.node(anchor).pos.unwrap();
    assert!((p.x - 3.0).abs() < 1e-9);
    assert!((p.y + 2.0).abs() < 1e-9);
    assert!(g.node(free).pos.is_some());
}

#[test]
fn fixed_seeds_reproduce_layouts_exactly() {
    let build = || {
        let mut g = LayoutGraph::default();
        let ids: Vec<NodeId> = (0..12).map(|_| g.add_node(NodeLabel::default())).collect();
        for i in 0..12 {
            g.add_edge(ids[i], ids[(i + 1) % 12], spring_edge(1.0, None));
            if i % 3 == 0 {
                g.add_edge(ids[i], ids[(i + 5) % 12], spring_edge(2.0, None));
            }
        }
        (g, ids)
    };
    let params = Params {
        k: 1.0,
        max_iter: 60,
        seed: Seed::Fixed(99),
        ..Params::default()
    };

    let (mut g1, ids1) = build();
    let (mut g2, ids2) = build();
    force::layout(&mut g1, &[], &params, None);
    force::layout(&mut g2, &[], &params, None);
    assert_eq!(positions(&g1, &ids1), positions(&g2, &ids2));
}

#[test]
fn layouts_do_not_diverge() {
    let mut g = LayoutGraph::default();
    let n = 20;
    let ids: Vec<NodeId> = (0..n).map(|_| g.add_node(NodeLabel::default())).collect();
    for i in 0..n {
        g.add_edge(ids[i], ids[(i + 1) % n], spring_edge(1.0, None));
    }
    let params = Params {
        k: 1.0,
        max_iter: 200,
        seed: Seed::Fixed(5),
        ..Params::default()
    };
    force::layout(&mut g, &[], &params, None);

    let ps = positions(&g, &ids);
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in i + 1..n {
            total += ps[i].dist(ps[j]);
            pairs += 1;
        }
    }
    let avg = total / pairs as f64;
    // The enclosing square has half-side 1.2 * k * sqrt(n); anything within a
    // few multiples of that is "not diverged".
    assert!(avg < 10.0 * 1.2 * (n as f64).sqrt());
}

#[test]
fn a_preset_cancel_flag_leaves_initial_placement() {
    let mut g = LayoutGraph::default();
    let given = [Point::new(1.0, 1.0), Point::new(4.0, 5.0)];
    let ids: Vec<NodeId> = given
        .iter()
        .map(|&p| {
            g.add_node(NodeLabel {
                pos: Some(p),
                pinned: Pinned::Position,
                ..NodeLabel::default()
            })
        })
        .collect();
    g.add_edge(ids[0], ids[1], spring_edge(1.0, None));

    let cancel = AtomicBool::new(true);
    force::layout(&mut g, &[], &Params::default(), Some(&cancel));

    for (&v, &expected) in ids.iter().zip(&given) {
        let p = g.node(v).pos.unwrap();
        assert!((p.x - expected.x).abs() < 1e-9);
        assert!((p.y - expected.y).abs() < 1e-9);
    }
}

#[test]
fn init_params_reads_graph_attributes() {
    let mut g = LayoutGraph::default();
    g.graph_mut().maxiter = Some(250);
    g.graph_mut().k = Some(0.7);
    g.graph_mut().t0 = Some(4.0);
    g.graph_mut().start = Some("123".into());

    let p = force::init_params(&g);
    assert_eq!(p.max_iter, 250);
    assert_eq!(p.k, 0.7);
    assert_eq!(p.t0, Some(4.0));
    assert_eq!(p.seed, Seed::Fixed(123));

    g.graph_mut().start = Some("random".into());
    assert_eq!(force::init_params(&g).seed, Seed::Random);
    g.graph_mut().start = Some("self".into());
    assert_eq!(force::init_params(&g).seed, Seed::SelfPlacement);
}

#[test]
fn the_schedule_reports_the_pass_split() {
    let mut g = LayoutGraph::default();
    g.add_node(NodeLabel::default());
    let params = Params {
        max_iter: 100,
        unscaled: 40,
        t0: Some(0.5),
        ..Params::default()
    };
    let schedule = force::layout(&mut g, &[], &params, None);
    assert_eq!(schedule.num_iters, 100);
    assert_eq!(schedule.loopcnt, 40);
    assert_eq!(schedule.t0, 0.5);
    assert_eq!(schedule.k, params.k);
}
