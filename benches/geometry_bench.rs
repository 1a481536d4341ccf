//! Geometry generation benchmarks.

// criterion_group! expands to undocumented public items.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use desk_scene::geometry::{self, MeshData, ShapeKind};

fn shape_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_build");
    for kind in ShapeKind::ALL {
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter(|| black_box(geometry::build(black_box(kind))))
        });
    }
    group.finish();
}

fn sphere_tessellation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("uv_sphere");
    for (rings, segments) in [(15, 16), (32, 32), (64, 64)] {
        group.bench_function(format!("{rings}x{segments}"), |b| {
            b.iter(|| {
                black_box(MeshData::uv_sphere(black_box(rings), black_box(segments)))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, shape_build_benchmark, sphere_tessellation_benchmark);
criterion_main!(benches);
