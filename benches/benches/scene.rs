// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `canopy_scene`: property writes, flushes and disposal.

use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use canopy_scene::{Axis, Grid, NodeId, NullSurface, Scene, Stack};

fn populated(children: usize) -> (Scene, NodeId, Vec<NodeId>) {
    let mut scene = Scene::new(NullSurface);
    let root = scene.create_container(Grid::new(16, 2.0));
    let ids: Vec<NodeId> = (0..children)
        .map(|_| {
            let id = scene.create_circle(4.0).expect("circle");
            scene.add_child(root, id, None).expect("root is a container");
            id
        })
        .collect();
    scene.flush(Duration::ZERO);
    (scene, root, ids)
}

fn bench_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/property");
    let (mut scene, _, ids) = populated(1);
    let p = scene.props();
    let id = ids[0];

    group.bench_function("get/plain", |b| {
        b.iter(|| black_box(scene.get(id, p.radius).expect("live")));
    });

    scene.add_adapter(id, p.radius, 0, |r, _| r * 2.0).expect("live");
    group.bench_function("get/adapted_cached", |b| {
        b.iter(|| black_box(scene.get(id, p.radius).expect("live")));
    });

    let mut r = 0.0;
    group.bench_function("set/changed", |b| {
        b.iter(|| {
            r += 1.0;
            black_box(scene.set(id, p.radius, r).expect("live"))
        });
    });
    group.bench_function("set/unchanged", |b| {
        b.iter(|| black_box(scene.set(id, p.radius, r).expect("live")));
    });
    group.finish();
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/flush");
    for n in [16_usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::new("one_dirty_child", n), &n, |b, &n| {
            let (mut scene, _, ids) = populated(n);
            let p = scene.props();
            let mut r = 4.0;
            b.iter(|| {
                r += 0.5;
                scene.set(ids[n / 2], p.radius, r).expect("live");
                black_box(scene.flush(Duration::ZERO))
            });
        });

        group.bench_with_input(BenchmarkId::new("all_dirty", n), &n, |b, &n| {
            let (mut scene, _, ids) = populated(n);
            let p = scene.props();
            let mut r = 4.0;
            b.iter(|| {
                r += 0.5;
                for id in &ids {
                    scene.set(*id, p.radius, r).expect("live");
                }
                black_box(scene.flush(Duration::ZERO))
            });
        });

        group.bench_with_input(BenchmarkId::new("relayout_stack", n), &n, |b, &n| {
            let (mut scene, root, _) = populated(n);
            let mut vertical = false;
            b.iter(|| {
                vertical = !vertical;
                let axis = if vertical {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                };
                scene.set_layout(root, Stack::new(axis, 1.0)).expect("live");
                black_box(scene.flush(Duration::ZERO))
            });
        });
    }
    group.finish();
}

fn bench_dispose(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene/dispose");
    for n in [16_usize, 1024] {
        group.bench_with_input(BenchmarkId::new("subtree", n), &n, |b, &n| {
            b.iter_batched(
                || populated(n),
                |(mut scene, root, _)| black_box(scene.dispose(root)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_properties, bench_flush, bench_dispose);
criterion_main!(benches);
