//! # Layout Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - Re-laying out a full screen of elements fits comfortably in a frame
//! - Building constraints costs no more than resolving them
//!
//! Run with: `cargo bench --package keystone_ui`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keystone_ui::{Anchor, Container, ElementId, Location, Panel};

/// A vertical list: each row hangs below the previous one and spans the
/// container width.
fn list(rows: usize) -> Container {
    let mut container = Container::new();
    let mut previous: Option<ElementId> = None;

    for _ in 0..rows {
        let row = container.add(Panel::with_default_size(10, 24, [0.2, 0.2, 0.2, 1.0]));
        let above = previous.map_or(Anchor::container(Location::North), |p| Anchor::new(p, Location::South));

        container
            .constrain(Anchor::new(row, Location::North), above, 2)
            .unwrap();
        container
            .constrain(Anchor::new(row, Location::West), Anchor::container(Location::West), 8)
            .unwrap();
        container
            .constrain(Anchor::new(row, Location::East), Anchor::container(Location::East), 8)
            .unwrap();
        previous = Some(row);
    }

    container
}

/// Benchmark: resolving a list of N rows.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    for rows in [16_usize, 128, 1024] {
        let mut container = list(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| container.layout(black_box(1920), black_box(1080)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark: building the constraint forest for 128 rows.
fn bench_build(c: &mut Criterion) {
    c.bench_function("build_128", |b| {
        b.iter(|| black_box(list(128)));
    });
}

criterion_group!(benches, bench_layout, bench_build);
criterion_main!(benches);
