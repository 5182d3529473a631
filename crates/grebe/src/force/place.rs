//! Initial placement: the boundary ellipse, port pinning, and neighbor
//! averaging for free nodes.

use super::{EXPFACTOR, PortSpec, XorShift64Star};
use crate::LayoutGraph;
use crate::model::{Pinned, Point};

pub(super) struct Placement {
    /// Working positions, centered on the origin.
    pub(super) pos: Vec<Point>,
    pub(super) is_port: Vec<bool>,
    pub(super) fixed: Vec<bool>,
    pub(super) wd: f64,
    pub(super) ht: f64,
    pub(super) has_ports: bool,
    /// Translation undone after the simulation.
    pub(super) ctr: Point,
}

pub(super) fn init_positions(
    g: &LayoutGraph,
    ports: &[PortSpec],
    k: f64,
    rng: &mut XorShift64Star,
) -> Placement {
    let n = g.node_count();
    let mut is_port = vec![false; n];
    for p in ports {
        is_port[p.node.index()] = true;
    }
    let has_ports = !ports.is_empty();

    let base = EXPFACTOR * k * (n as f64).sqrt();
    let mut wd = base;
    let mut ht = base;

    // Pre-positioned nodes shift the center and may grow the ellipse to the
    // one inscribing their bounding box.
    let mut ctr = Point::default();
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut have_pinned = false;
    for v in g.node_ids() {
        let lbl = g.node(v);
        if is_port[v.index()] || matches!(lbl.pinned, Pinned::None) {
            continue;
        }
        if let Some(p) = lbl.pos {
            have_pinned = true;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
    }
    if have_pinned {
        ctr = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        wd = wd.max((max_x - min_x) / 2.0);
        ht = ht.max((max_y - min_y) / 2.0);
        let alpha = ht.atan2(wd);
        wd /= alpha.cos();
        ht /= alpha.sin();
    }

    let mut pos = vec![Point::default(); n];
    let mut placed = vec![false; n];
    let mut fixed = vec![false; n];

    for v in g.node_ids() {
        let ix = v.index();
        let lbl = g.node(v);
        if is_port[ix] {
            continue;
        }
        if matches!(lbl.pinned, Pinned::Fixed) {
            fixed[ix] = true;
        }
        if !matches!(lbl.pinned, Pinned::None) {
            if let Some(p) = lbl.pos {
                pos[ix] = Point::new(p.x - ctr.x, p.y - ctr.y);
                placed[ix] = true;
            }
        }
    }

    for p in ports {
        let ix = p.node.index();
        pos[ix] = Point::new(wd * p.angle.cos(), ht * p.angle.sin());
        placed[ix] = true;
    }

    for v in g.node_ids() {
        let ix = v.index();
        if placed[ix] {
            continue;
        }
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut cnt = 0usize;
        for &e in g.out_edges(v) {
            let w = g.head(e).index();
            if placed[w] {
                sx += pos[w].x;
                sy += pos[w].y;
                cnt += 1;
            }
        }
        for &e in g.in_edges(v) {
            let w = g.tail(e).index();
            if placed[w] {
                sx += pos[w].x;
                sy += pos[w].y;
                cnt += 1;
            }
        }

        pos[ix] = if cnt > 0 {
            Point::new(sx / cnt as f64, sy / cnt as f64)
        } else if has_ports {
            let angle = std::f64::consts::TAU * rng.next_f64_unit();
            let radius = rng.next_f64_unit();
            Point::new(wd * radius * angle.cos(), ht * radius * angle.sin())
        } else {
            Point::new(
                wd * (2.0 * rng.next_f64_unit() - 1.0),
                ht * (2.0 * rng.next_f64_unit() - 1.0),
            )
        };
        placed[ix] = true;
    }

    Placement {
        pos,
        is_port,
        fixed,
        wd,
        ht,
        has_ports,
        ctr,
    }
}
