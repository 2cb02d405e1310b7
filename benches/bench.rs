use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use tui_treemap::{NodeId, RandomColour, TmTree, Treemap};

/// Every internal node has `fanout` children, leaves are sized by their index.
fn generated_tree(depth: u32, fanout: usize) -> TmTree {
    fn insert(tree: &mut TmTree, depth: u32, fanout: usize, counter: &mut u64) -> NodeId {
        if depth == 0 {
            *counter += 1;
            return tree.insert_leaf(counter.to_string(), *counter);
        }
        let children = (0..fanout)
            .map(|_| insert(tree, depth - 1, fanout, counter))
            .collect();
        tree.insert(format!("level-{depth}"), children)
            .expect("children are freshly inserted")
    }

    let mut tree = TmTree::new().with_colours(RandomColour::with_seed(0));
    insert(&mut tree, depth, fanout, &mut 0);
    tree
}

fn init(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("init");
    group.throughput(Throughput::Elements(1)); // Trees per second

    group.bench_function("empty", |bencher| {
        bencher.iter(|| {
            black_box(TmTree::new());
        });
    });

    group.bench_function("depth-5-fanout-5", |bencher| {
        bencher.iter(|| {
            black_box(generated_tree(black_box(5), black_box(5)));
        });
    });

    group.finish();
}

fn layout(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("layout");
    group.throughput(Throughput::Elements(1)); // Layouts per second

    let area = Rect::new(0, 0, 200, 100);

    let mut tree = generated_tree(5, 5);
    group.bench_function("compute", |bencher| {
        bencher.iter(|| tree.compute_layout(black_box(area)));
    });

    tree.expand_all(tree.root().expect("tree has a root"));
    tree.compute_layout(area);
    group.bench_function("visible-rects-all-expanded", |bencher| {
        bencher.iter(|| black_box(tree.collect_visible_rects()));
    });

    group.bench_function("hit-test-all-expanded", |bencher| {
        bencher.iter(|| black_box(tree.hit_test(black_box((150, 80)))));
    });

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    let tree = generated_tree(0, 0);
    group.bench_function("single-leaf", |bencher| {
        bencher.iter_batched(
            || tree_clone(&tree),
            |mut tree| {
                let mut buffer = Buffer::empty(buffer_size);
                Treemap::new().render(buffer_size, black_box(&mut buffer), &mut tree);
            },
            BatchSize::SmallInput,
        );
    });

    let tree = generated_tree(5, 5);
    group.bench_function("depth-5-fanout-5-expanded", |bencher| {
        bencher.iter_batched(
            || {
                let mut tree = tree_clone(&tree);
                tree.expand_all(tree.root().expect("tree has a root"));
                tree
            },
            |mut tree| {
                let mut buffer = Buffer::empty(buffer_size);
                Treemap::new().render(buffer_size, black_box(&mut buffer), &mut tree);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Rebuild `tree` node by node as `TmTree` owns its colour source and can not be cloned.
fn tree_clone(tree: &TmTree) -> TmTree {
    fn copy(from: &TmTree, id: NodeId, into: &mut TmTree) -> NodeId {
        let node = &from[id];
        let name = node.name().unwrap_or_default();
        if node.is_leaf() {
            return into.insert_leaf(name, node.data_size());
        }
        let children = node
            .children()
            .iter()
            .map(|&child| copy(from, child, into))
            .collect();
        into.insert(name, children)
            .expect("children are freshly inserted")
    }

    let mut result = TmTree::new().with_colours(RandomColour::with_seed(0));
    if let Some(root) = tree.root() {
        copy(tree, root, &mut result);
    }
    result
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = init, layout, renders
}
criterion_main!(benches);
