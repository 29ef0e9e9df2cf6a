//! Cross-structure integration properties (spec.md §8, properties 4 and 7)
//! that don't fit naturally inside a single `accel/*.rs` module: they compare
//! across [`Bvh`]/[`KdTree`]/[`Octree`], or across an instance wrapper and a
//! bare mesh.

use assert2::assert;
use nalgebra::Isometry3;
use test_strategy::proptest;
use triaccel::{
    accel::{AccelStructKind, Index, MeshInstance, RayStats},
    geometry::{MISS_T, WorldPoint, WorldVector},
    mesh::Mesh,
};

/// A deliberately irregular mesh (mixed triangle sizes and orientations) so
/// equivalence holds for more than the perfectly regular grids used in the
/// inline per-structure tests.
fn scattered_mesh() -> Mesh {
    let mut positions = Vec::new();
    let mut faces = Vec::new();
    let mut rng_state: u64 = 0x9e3779b97f4a7c15;
    let mut next = || {
        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 7;
        rng_state ^= rng_state << 17;
        ((rng_state >> 40) as f32 / (1u32 << 24) as f32) * 10.0 - 5.0
    };
    for _ in 0..200 {
        let base = positions.len() as u32;
        let (cx, cy, cz) = (next(), next(), next());
        positions.push(WorldPoint::new(cx, cy, cz));
        positions.push(WorldPoint::new(cx + 0.5, cy, cz));
        positions.push(WorldPoint::new(cx, cy + 0.5, cz));
        faces.push(([base, base + 1, base + 2], [0, 0, 0]));
    }
    Mesh::from_triangle_soup(positions, vec![WorldVector::new(0.0, 0.0, 1.0)], faces)
}

/// Property 4: the three structures must agree on nearest-hit `(tri_index, t)`
/// for any non-degenerate ray, within floating-point tolerance.
#[proptest]
fn every_structure_agrees_on_nearest_hit(
    #[strategy(-10.0f32..10.0)] ox: f32,
    #[strategy(-10.0f32..10.0)] oy: f32,
    #[strategy(-10.0f32..10.0)] dx: f32,
    #[strategy(-10.0f32..10.0)] dy: f32,
) {
    let mesh = scattered_mesh();
    let direction = WorldVector::new(dx, dy, 1.0);
    if direction.norm() < 1e-4 {
        return;
    }

    let bvh = Index::build(&mesh, AccelStructKind::Bvh);
    let kd = Index::build(&mesh, AccelStructKind::KdTree);
    let oct = Index::build(&mesh, AccelStructKind::Octree);

    let origin = WorldPoint::new(ox, oy, -20.0);
    let mut ray_bvh = triaccel::geometry::Ray::new(origin, direction);
    let mut ray_kd = triaccel::geometry::Ray::new(origin, direction);
    let mut ray_oct = triaccel::geometry::Ray::new(origin, direction);
    let mut stats = RayStats::default();

    bvh.intersect(&mesh, &mut ray_bvh, &mut stats);
    kd.intersect(&mesh, &mut ray_kd, &mut stats);
    oct.intersect(&mesh, &mut ray_oct, &mut stats);

    assert!(ray_bvh.hit.is_miss() == ray_kd.hit.is_miss());
    assert!(ray_bvh.hit.is_miss() == ray_oct.hit.is_miss());
    if !ray_bvh.hit.is_miss() {
        assert!((ray_bvh.hit.t - ray_kd.hit.t).abs() < 1e-3);
        assert!((ray_bvh.hit.t - ray_oct.hit.t).abs() < 1e-3);
    }
}

/// Property 7: wrapping a mesh in an identity-transform instance must not
/// change the hit distance a bare index reports for the same ray.
#[test]
fn instance_with_identity_transform_matches_the_bare_index() {
    let mesh = scattered_mesh();
    let ray_origin = WorldPoint::new(0.1, 0.1, -20.0);
    let ray_direction = WorldVector::new(0.0, 0.0, 1.0);

    let bare_index = Index::build(&mesh, AccelStructKind::Bvh);
    let mut bare_ray = triaccel::geometry::Ray::new(ray_origin, ray_direction);
    let mut stats = RayStats::default();
    bare_index.intersect(&mesh, &mut bare_ray, &mut stats);

    let wrapped_index = Index::build(&mesh, AccelStructKind::Bvh);
    let instance = MeshInstance::new(mesh, wrapped_index, Isometry3::identity(), 0, WorldVector::new(1.0, 1.0, 1.0));
    let mut instance_ray = triaccel::geometry::Ray::new(ray_origin, ray_direction);
    instance.intersect(&mut instance_ray, &mut stats);

    assert!(bare_ray.hit.is_miss() == instance_ray.hit.is_miss());
    if !bare_ray.hit.is_miss() {
        assert!((bare_ray.hit.t - instance_ray.hit.t).abs() < 1e-4);
    }
}

#[test]
fn every_structure_reports_the_same_triangle_count() {
    let mesh = scattered_mesh();
    let bvh = Index::build(&mesh, AccelStructKind::Bvh);
    let kd = Index::build(&mesh, AccelStructKind::KdTree);
    let oct = Index::build(&mesh, AccelStructKind::Octree);
    assert!(bvh.tri_count() == mesh.triangle_count());
    assert!(kd.tri_count() >= mesh.triangle_count());
    assert!(oct.tri_count() >= mesh.triangle_count());
}

#[test]
fn a_ray_missing_every_structures_world_box_reports_the_sentinel() {
    let mesh = scattered_mesh();
    let index = Index::build(&mesh, AccelStructKind::Bvh);
    let mut ray = triaccel::geometry::Ray::new(WorldPoint::new(1000.0, 1000.0, -20.0), WorldVector::new(0.0, 0.0, 1.0));
    let mut stats = RayStats::default();
    index.intersect(&mesh, &mut ray, &mut stats);
    assert!(ray.hit.t == MISS_T);
}
