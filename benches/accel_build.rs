//! Build-time comparison across the three acceleration structures (spec.md §1
//! "sandbox for comparing... build/traversal cost"), grounded on the teacher's
//! own `benches/render_teapot.rs` criterion harness.

use criterion::{Criterion, criterion_group, criterion_main};
use triaccel::{
    accel::{AccelStructKind, Index},
    geometry::{WorldPoint, WorldVector},
    mesh::Mesh,
};

/// A grid of disjoint triangles standing in for the teacher's `data/teapot.obj`,
/// which is not present in the retrieved repo snapshot (see DESIGN.md).
fn grid_mesh(n: usize) -> Mesh {
    let mut positions = Vec::with_capacity(n * 3);
    let mut faces = Vec::with_capacity(n);
    for i in 0..n {
        let x = (i % 64) as f32 * 2.0;
        let z = (i / 64) as f32 * 2.0;
        let base = positions.len() as u32;
        positions.push(WorldPoint::new(x, 0.0, z));
        positions.push(WorldPoint::new(x + 1.0, 0.0, z));
        positions.push(WorldPoint::new(x, 1.0, z + 1.0));
        faces.push(([base, base + 1, base + 2], [0, 0, 0]));
    }
    Mesh::from_triangle_soup(positions, vec![WorldVector::new(0.0, 1.0, 0.0)], faces)
}

fn criterion_benchmark(c: &mut Criterion) {
    let mesh = grid_mesh(2_048);

    let mut group = c.benchmark_group("accel_build");
    for kind in [AccelStructKind::Bvh, AccelStructKind::KdTree, AccelStructKind::Octree] {
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter(|| Index::build(&mesh, kind));
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
