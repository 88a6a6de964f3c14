//! # State Stack Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - Redundant binds cost a lookup, never a native call
//! - Push/pop of a typical draw scope stays in the sub-microsecond range
//!
//! Run with: `cargo bench --package keystone_gl`

#![allow(missing_docs)]

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keystone_gl::{
    BlendFactor, Buffer, BufferTarget, Capability, CompareFunction, Context, RecordingBackend, Texture,
    TextureTarget,
};

fn context() -> Context {
    Context::new(Rc::new(RecordingBackend::new()), 1920, 1080)
}

/// Benchmark: binding the already-bound buffer.
fn bench_redundant_bind(c: &mut Criterion) {
    let mut ctx = context();
    let buffer = Buffer::new(&ctx, BufferTarget::Array);
    ctx.bind_buffer(&buffer);

    c.bench_function("redundant_bind", |b| {
        b.iter(|| ctx.bind_buffer(black_box(&buffer)));
    });
}

/// Benchmark: a draw scope that changes blend state and a texture.
fn bench_draw_scope(c: &mut Criterion) {
    let mut ctx = context();
    let texture = Texture::new(&ctx, TextureTarget::Texture2D);

    c.bench_function("draw_scope", |b| {
        b.iter(|| {
            let mut scope = ctx.scope();
            scope.enable(Capability::Blend);
            scope.set_blend_function(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
            scope.set_depth_function(CompareFunction::LessOrEqual);
            scope.bind_texture(0, black_box(&texture));
        });
    });
}

/// Benchmark: effective-value lookups through deep stacks.
fn bench_deep_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_lookup");

    for depth in [1_usize, 8, 64] {
        let mut ctx = context();
        ctx.enable(Capability::DepthTest);
        for _ in 0..depth {
            ctx.push();
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(ctx.is_enabled(Capability::DepthTest)));
        });

        for _ in 0..depth {
            ctx.pop();
        }
    }

    group.finish();
}

criterion_group!(benches, bench_redundant_bind, bench_draw_scope, bench_deep_lookup);
criterion_main!(benches);
