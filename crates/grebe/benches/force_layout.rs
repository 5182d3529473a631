use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use grebe::force::{self, Params, Seed};
use grebe::{EdgeLabel, LayoutGraph, NodeLabel};
use std::hint::black_box;

fn build_ring_with_chords(node_count: usize) -> LayoutGraph {
    let mut g = LayoutGraph::default();
    let ids: Vec<_> = (0..node_count)
        .map(|_| g.add_node(NodeLabel::default()))
        .collect();
    for i in 0..node_count {
        g.add_edge(
            ids[i],
            ids[(i + 1) % node_count],
            EdgeLabel {
                minlen: 1,
                weight: 1.0,
                len: None,
            },
        );
        if i % 4 == 0 {
            g.add_edge(
                ids[i],
                ids[(i + node_count / 3) % node_count],
                EdgeLabel {
                    minlen: 1,
                    weight: 2.0,
                    len: None,
                },
            );
        }
    }
    g
}

fn bench_force_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_layout");
    group.sample_size(20);
    for &n in &[100usize, 400] {
        for use_grid in [true, false] {
            let label = if use_grid { "grid" } else { "all_pairs" };
            let params = Params {
                use_grid,
                k: 1.0,
                max_iter: 100,
                seed: Seed::Fixed(1),
                ..Params::default()
            };
            group.bench_with_input(
                BenchmarkId::new(label, n),
                &(n, params),
                |b, (n, params)| {
                    b.iter_batched(
                        || build_ring_with_chords(*n),
                        |mut g| {
                            force::layout(&mut g, &[], params, None);
                            black_box(g)
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_force_layout);
criterion_main!(benches);
