// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use canopy_dirty::{DirtyKinds, DirtyQueue};

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirty/queue");
    for n in [64_u32, 4096] {
        group.bench_with_input(BenchmarkId::new("mark_take", n), &n, |b, &n| {
            let mut queue = DirtyQueue::new();
            b.iter(|| {
                for key in 0..n {
                    queue.mark(key, DirtyKinds::DRAW);
                }
                black_box(queue.take())
            });
        });

        group.bench_with_input(BenchmarkId::new("coalesce", n), &n, |b, &n| {
            let mut queue = DirtyQueue::new();
            b.iter(|| {
                for key in 0..n {
                    queue.mark(key % 8, DirtyKinds::MEASURE);
                    queue.mark(key % 8, DirtyKinds::DRAW);
                }
                black_box(queue.take())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_queue);
criterion_main!(benches);
