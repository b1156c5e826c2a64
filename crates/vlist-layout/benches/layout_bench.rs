//! Benchmarks for layout packing and visibility queries.
//!
//! Run with: cargo bench -p vlist-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vlist_core::{Size, SizeHint};
use vlist_layout::{LayoutStrategy, MixedGrid, SHELF_WIDTH, ShelfPacker};

fn rects(n: usize) -> Vec<Size> {
    (0..n)
        .map(|i| Size::new(20.0 + (i % 7) as f64 * 10.0, 75.0 + (i % 11) as f64 * 20.0))
        .collect()
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/pack");
    for n in [1_000, 10_000, 100_000] {
        let input = rects(n);
        group.bench_with_input(BenchmarkId::new("shelf_first", n), &input, |b, input| {
            b.iter(|| black_box(ShelfPacker::pack(input, SHELF_WIDTH)))
        });
    }
    group.finish();
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/append");
    let page = rects(50);
    group.bench_function("50_onto_10k", |b| {
        b.iter_batched(
            || ShelfPacker::pack(&rects(10_000), SHELF_WIDTH),
            |mut packer| {
                packer.append(&page);
                black_box(packer)
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/visibility");
    let hints: Vec<SizeHint> = rects(100_000)
        .into_iter()
        .map(|r| SizeHint::new(r.width, r.height))
        .collect();
    let grid = MixedGrid::new(&hints);
    let height = grid.content_size(1280.0, 720.0).height;
    group.bench_function("mixed_grid_index_and_count", |b| {
        let mut top = 0.0;
        b.iter(|| {
            top = (top + 997.0) % height;
            let first = grid.index_at(0.0, top, 1280.0, 720.0);
            let count = grid.count(0.0, top, 1280.0, 720.0);
            black_box((first, count))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_pack, bench_append, bench_visibility);
criterion_main!(benches);
