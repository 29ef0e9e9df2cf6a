//! Acceleration structures over a single [`crate::mesh::Mesh`].
//!
//! Three node-arena builders — [`bvh::Bvh`], [`kdtree::KdTree`],
//! [`octree::Octree`] — share an arena (`arena`), a split-cost search (`sah`),
//! and an iterative traversal (`traverse`). [`Index`] is the sum type a
//! [`instance::MeshInstance`] holds so the renderer can swap structures on a
//! loaded mesh without touching call sites.

pub mod arena;
pub mod bvh;
pub mod instance;
pub mod kdtree;
pub mod octree;
mod sah;
mod traverse;

pub use bvh::{Bvh, BvhSplit};
pub use instance::MeshInstance;
pub use kdtree::KdTree;
pub use octree::Octree;

use crate::{geometry::Ray, mesh::Mesh};

/// Per-ray counters a caller owns and passes in by `&mut` — never a shared
/// global. Workers aggregate these across threads by
/// [`RayStats::merge`]-ing into a running total; no shared mutable counter
/// ever exists mid-trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RayStats {
    pub intersection_tests: u64,
    pub traversal_steps: u64,
}

impl RayStats {
    pub fn merge(&mut self, other: &RayStats) {
        self.intersection_tests += other.intersection_tests;
        self.traversal_steps += other.traversal_steps;
    }
}

/// Which acceleration structure a [`MeshInstance`] is currently traced
/// against. Spec.md §4.7: "the dispatcher is a single entry point... callers
/// never branch on which structure backs a given mesh."
#[derive(Clone, Debug)]
pub enum Index {
    Bvh(Bvh),
    KdTree(KdTree),
    Octree(Octree),
}

impl Index {
    pub fn build(mesh: &Mesh, kind: AccelStructKind) -> Self {
        match kind {
            AccelStructKind::Bvh => Index::Bvh(Bvh::build(mesh, BvhSplit::Sah)),
            AccelStructKind::KdTree => Index::KdTree(KdTree::build(mesh)),
            AccelStructKind::Octree => Index::Octree(Octree::build(mesh)),
        }
    }

    pub fn intersect(&self, mesh: &Mesh, ray: &mut Ray, stats: &mut RayStats) {
        match self {
            Index::Bvh(bvh) => bvh.intersect(mesh, ray, stats),
            Index::KdTree(kd) => kd.intersect(mesh, ray, stats),
            Index::Octree(oct) => oct.intersect(mesh, ray, stats),
        }
    }

    pub fn tri_count(&self) -> usize {
        match self {
            Index::Bvh(bvh) => bvh.tri_count(),
            Index::KdTree(kd) => kd.tri_count(),
            Index::Octree(oct) => oct.tri_count(),
        }
    }

    /// Spec.md §6: "Public fields exposed: `rootNodeIdx` (always 0)..." — every
    /// builder starts its arena with `push`/`alloc` at index 0, so this is
    /// always `0` in practice, but each structure still reports its own.
    pub fn root_node_idx(&self) -> u32 {
        match self {
            Index::Bvh(bvh) => bvh.root_node_idx(),
            Index::KdTree(kd) => kd.root_node_idx(),
            Index::Octree(oct) => oct.root_node_idx(),
        }
    }
}

/// Selects which builder [`Index::build`] runs; exposed on the CLI so the
/// same scene can be compared across structures (spec.md §1 "sandbox").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AccelStructKind {
    #[default]
    Bvh,
    KdTree,
    Octree,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MISS_T, Ray, WorldPoint, WorldVector};
    use assert2::assert;
    use test_case::test_case;

    fn grid_mesh(n: usize) -> Mesh {
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        for i in 0..n {
            let x = i as f32 * 2.0;
            let base = positions.len() as u32;
            positions.push(WorldPoint::new(x, 0.0, 0.0));
            positions.push(WorldPoint::new(x + 1.0, 0.0, 0.0));
            positions.push(WorldPoint::new(x, 1.0, 0.0));
            faces.push(([base, base + 1, base + 2], [0, 0, 0]));
        }
        Mesh::from_triangle_soup(positions, vec![WorldVector::new(0.0, 0.0, 1.0)], faces)
    }

    #[test_case(AccelStructKind::Bvh; "bvh")]
    #[test_case(AccelStructKind::KdTree; "kdtree")]
    #[test_case(AccelStructKind::Octree; "octree")]
    fn every_structure_finds_the_same_nearest_hit(kind: AccelStructKind) {
        let mesh = grid_mesh(20);
        let index = Index::build(&mesh, kind);
        let mut ray = Ray::new(WorldPoint::new(0.25, 0.25, -1.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut stats = RayStats::default();
        index.intersect(&mesh, &mut ray, &mut stats);
        assert!((ray.hit.t - 1.0).abs() < 1e-4);
        assert!(ray.hit.tri_index == 0);
    }

    #[test_case(AccelStructKind::Bvh; "bvh")]
    #[test_case(AccelStructKind::KdTree; "kdtree")]
    #[test_case(AccelStructKind::Octree; "octree")]
    fn every_structure_reports_a_clean_miss(kind: AccelStructKind) {
        let mesh = grid_mesh(20);
        let index = Index::build(&mesh, kind);
        let mut ray = Ray::new(WorldPoint::new(-50.0, -50.0, -1.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut stats = RayStats::default();
        index.intersect(&mesh, &mut ray, &mut stats);
        assert!(ray.hit.t == MISS_T);
    }

    #[test_case(AccelStructKind::Bvh; "bvh")]
    #[test_case(AccelStructKind::KdTree; "kdtree")]
    #[test_case(AccelStructKind::Octree; "octree")]
    fn root_node_idx_is_always_zero(kind: AccelStructKind) {
        let mesh = grid_mesh(20);
        let index = Index::build(&mesh, kind);
        assert!(index.root_node_idx() == 0);
    }

    #[test]
    fn stats_merge_sums_both_counters() {
        let mut total = RayStats { intersection_tests: 3, traversal_steps: 1 };
        total.merge(&RayStats { intersection_tests: 2, traversal_steps: 5 });
        assert!(total.intersection_tests == 5);
        assert!(total.traversal_steps == 6);
    }
}
