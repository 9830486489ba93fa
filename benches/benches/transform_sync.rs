// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use understory_transform_tree::{NodeId, Tree};

/// A root with `fanout` chains of `depth` nodes each.
fn gen_forest(fanout: usize, depth: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let root = tree.create_root("root");
    let mut leaves = Vec::with_capacity(fanout);
    for i in 0..fanout {
        let mut parent = root;
        for d in 0..depth {
            let id = tree.create_node("n");
            tree.set_local_position(id, Vec3::new(i as f32, d as f32, 0.0));
            tree.set_local_rotation(id, Quat::from_rotation_z(0.01 * d as f32));
            tree.add_child(parent, id);
            parent = id;
        }
        leaves.push(parent);
    }
    (tree, root, leaves)
}

/// `width`-ary tree of the given depth, for wide scenes.
fn gen_wide(width: usize, depth: usize) -> (Tree, NodeId, Vec<NodeId>) {
    let mut tree = Tree::new();
    let root = tree.create_root("root");
    let mut level = vec![root];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * width);
        for &parent in &level {
            for i in 0..width {
                let id = tree.create_node("n");
                tree.set_local_position(id, Vec3::new(i as f32, 1.0, 0.0));
                tree.add_child(parent, id);
                next.push(id);
            }
        }
        level = next;
    }
    (tree, root, level)
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");
    for &(width, depth) in &[(4usize, 4usize), (8, 3), (16, 3)] {
        let (tree, _, _) = gen_wide(width, depth);
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_function(format!("full_w{}_d{}", width, depth), |b| {
            b.iter_batched(
                || tree.clone(),
                |mut tree| {
                    let stats = tree.sync_all();
                    black_box(stats);
                },
                BatchSize::SmallInput,
            )
        });

        let mut frozen = tree.clone();
        let _ = frozen.sync_all();
        group.bench_function(format!("frozen_w{}_d{}", width, depth), |b| {
            b.iter(|| black_box(frozen.sync_all()))
        });
    }
    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");
    let (mut tree, root, leaves) = gen_wide(8, 3);
    let _ = tree.sync_all();
    let leaf = leaves[leaves.len() / 2];
    group.bench_function("move_one_leaf_w8_d3", |b| {
        b.iter(|| {
            tree.translate_local(leaf, Vec3::X);
            black_box(tree.sync_all())
        })
    });
    group.bench_function("move_root_w8_d3", |b| {
        b.iter(|| {
            tree.translate_local(root, Vec3::X);
            black_box(tree.sync_all())
        })
    });
    group.finish();
}

fn bench_lazy_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy");
    for &depth in &[8usize, 32, 128] {
        let (tree, root, leaves) = gen_forest(4, depth);
        let leaf = leaves[0];
        group.bench_function(format!("position_dirty_chain_d{}", depth), |b| {
            b.iter_batched(
                || {
                    let mut tree = tree.clone();
                    tree.translate_local(root, Vec3::Y);
                    tree
                },
                |mut tree| black_box(tree.position(leaf)),
                BatchSize::SmallInput,
            )
        });

        let mut clean = tree.clone();
        let _ = clean.sync_all();
        group.bench_function(format!("position_clean_d{}", depth), |b| {
            b.iter(|| black_box(clean.position(leaf)))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[256usize, 1024] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("add_children_n{}", n), |b| {
            b.iter_batched(
                Tree::new,
                |mut tree| {
                    let root = tree.create_root("root");
                    for _ in 0..n {
                        let id = tree.create_node("n");
                        tree.add_child(root, id);
                    }
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sync,
    bench_incremental,
    bench_lazy_queries,
    bench_build
);
criterion_main!(benches);
