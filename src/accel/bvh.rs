//! Bounding-volume hierarchy builder (spec.md §4.3). Binary, nodes hold the
//! tight union of their children's AABBs, leaves own a contiguous range of
//! `tri_idx`. Grounded on the teacher's arena-push/recursive-build shape in
//! `scene/triangle_bvh/building.rs`, with its fixed 8-wide non-SAH split
//! replaced by spec.md's binary median-or-SAH strategy.

use crate::{
    accel::{
        RayStats,
        arena::{Node, NodeArena},
        sah, traverse,
    },
    geometry::{Aabb, Ray},
    mesh::Mesh,
};

/// Which split strategy `Bvh::build` uses. Spec.md §4.3 names both; SAH is
/// the default because it is the strictly more informed choice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BvhSplit {
    /// Terminate at `triCount <= 2`; split the longest axis at its midpoint.
    Median,
    /// Terminate when no candidate split improves on the parent's cost.
    Sah,
}

impl Default for BvhSplit {
    fn default() -> Self {
        BvhSplit::Sah
    }
}

#[derive(Clone, Debug)]
pub struct Bvh {
    nodes: NodeArena,
    tri_idx: Vec<u32>,
    root: u32,
}

impl Bvh {
    pub fn build(mesh: &Mesh, split: BvhSplit) -> Self {
        let n = mesh.triangle_count();
        let mut bvh = Bvh {
            nodes: NodeArena::with_capacity(2 * n.max(1)),
            tri_idx: (0..n as u32).collect(),
            root: 0,
        };

        let root_bounds = tight_aabb(mesh, &bvh.tri_idx, 0, bvh.tri_idx.len());
        bvh.root = bvh.nodes.push(Node {
            aabb_min: root_bounds.min,
            aabb_max: root_bounds.max,
            first_child: if n == 0 { crate::geometry::NO_INDEX } else { 0 },
            tri_count: n as u32,
        });

        if n > 0 {
            bvh.subdivide(mesh, bvh.root, split);
        }
        bvh
    }

    fn subdivide(&mut self, mesh: &Mesh, node_idx: u32, split: BvhSplit) {
        let node = *self.nodes.get(node_idx);
        let first = node.first_child;
        let count = node.tri_count;

        let chosen = match split {
            BvhSplit::Median => {
                if count <= 2 {
                    None
                } else {
                    let bounds = Aabb { min: node.aabb_min, max: node.aabb_max };
                    let axis = bounds.longest_axis();
                    let pos = (bounds.min[axis] + bounds.max[axis]) * 0.5;
                    Some((axis, pos))
                }
            }
            BvhSplit::Sah => {
                let parent_area = Aabb { min: node.aabb_min, max: node.aabb_max }.area();
                let range = &self.tri_idx[first as usize..(first + count) as usize];
                sah::best_split(mesh, range, parent_area)
            }
        };

        let Some((axis, split_pos)) = chosen else { return };

        // Two-pointer in-place partition of this node's slice of `tri_idx`.
        let mut i = first as usize;
        let mut j = (first + count) as usize;
        while i < j {
            if mesh.triangle(self.tri_idx[i]).centroid[axis] < split_pos {
                i += 1;
            } else {
                j -= 1;
                self.tri_idx.swap(i, j);
            }
        }
        let left_count = i - first as usize;
        if left_count == 0 || left_count as u32 == count {
            return; // abort the split, keep this node a leaf
        }

        let left_first = first;
        let right_first = first + left_count as u32;
        let right_count = count - left_count as u32;

        let left_bounds = tight_aabb(mesh, &self.tri_idx, left_first as usize, left_count);
        let right_bounds = tight_aabb(mesh, &self.tri_idx, right_first as usize, right_count as usize);

        let children = self.nodes.alloc(2);
        *self.nodes.get_mut(children) = Node {
            aabb_min: left_bounds.min,
            aabb_max: left_bounds.max,
            first_child: left_first,
            tri_count: left_count as u32,
        };
        *self.nodes.get_mut(children + 1) = Node {
            aabb_min: right_bounds.min,
            aabb_max: right_bounds.max,
            first_child: right_first,
            tri_count: right_count,
        };

        let node = self.nodes.get_mut(node_idx);
        node.first_child = children;
        node.tri_count = 0;

        self.subdivide(mesh, children, split);
        self.subdivide(mesh, children + 1, split);
    }

    pub fn intersect(&self, mesh: &Mesh, ray: &mut Ray, stats: &mut RayStats) {
        if self.tri_idx.is_empty() {
            return;
        }
        traverse::traverse_binary(&self.nodes, &self.tri_idx, self.root, mesh, ray, stats);
    }

    pub fn root_node_idx(&self) -> u32 {
        self.root
    }

    pub fn tri_count(&self) -> usize {
        self.tri_idx.len()
    }

    pub fn nodes_used(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn node(&self, idx: u32) -> &Node {
        self.nodes.get(idx)
    }

    #[cfg(test)]
    pub(crate) fn tri_idx(&self) -> &[u32] {
        &self.tri_idx
    }
}

fn tight_aabb(mesh: &Mesh, tri_idx: &[u32], first: usize, count: usize) -> Aabb {
    let mut b = Aabb::empty();
    for &ti in &tri_idx[first..first + count] {
        let (v0, v1, v2) = mesh.triangle_vertices(ti);
        b.grow(v0);
        b.grow(v1);
        b.grow(v2);
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MISS_T, WorldPoint, WorldVector};
    use assert2::assert;
    use std::collections::HashSet;

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

    #[test]
    fn build_on_empty_mesh_yields_a_leaf_root() {
        let mesh = Mesh::empty();
        let bvh = Bvh::build(&mesh, BvhSplit::Sah);
        assert!(bvh.tri_count() == 0);
        assert!(bvh.node(bvh.root_node_idx()).is_leaf());
    }

    #[test]
    fn partition_is_complete_for_both_split_strategies() {
        for split in [BvhSplit::Median, BvhSplit::Sah] {
            let mesh = grid_mesh(20);
            let bvh = Bvh::build(&mesh, split);
            let seen: HashSet<u32> = bvh.tri_idx().iter().copied().collect();
            assert!(seen.len() == 20);
            assert!(seen == (0..20u32).collect());
        }
    }

    #[test]
    fn interior_node_bounds_are_the_tight_union_of_children() {
        let mesh = grid_mesh(20);
        let bvh = Bvh::build(&mesh, BvhSplit::Sah);
        check_bounds_recursive(&bvh, bvh.root_node_idx());
    }

    fn check_bounds_recursive(bvh: &Bvh, idx: u32) {
        let node = bvh.node(idx);
        if node.is_leaf() {
            return;
        }
        let c0 = bvh.node(node.first_child);
        let c1 = bvh.node(node.first_child + 1);
        let expected = Aabb { min: c0.aabb_min, max: c0.aabb_max }.union(&Aabb { min: c1.aabb_min, max: c1.aabb_max });
        assert!((node.aabb_min - expected.min).norm() < 1e-5);
        assert!((node.aabb_max - expected.max).norm() < 1e-5);
        check_bounds_recursive(bvh, node.first_child);
        check_bounds_recursive(bvh, node.first_child + 1);
    }

    #[test]
    fn single_triangle_scene_reports_e1() {
        // spec.md E1
        let mesh = Mesh::from_triangle_soup(
            vec![
                WorldPoint::new(0.0, 0.0, 0.0),
                WorldPoint::new(1.0, 0.0, 0.0),
                WorldPoint::new(0.0, 1.0, 0.0),
            ],
            vec![WorldVector::new(0.0, 0.0, 1.0)],
            [([0, 1, 2], [0, 0, 0])],
        );
        let bvh = Bvh::build(&mesh, BvhSplit::Sah);
        let mut ray = Ray::new(WorldPoint::new(0.25, 0.25, -1.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut stats = RayStats::default();
        bvh.intersect(&mesh, &mut ray, &mut stats);
        assert!((ray.hit.t - 1.0).abs() < 1e-4);
        assert!((ray.hit.u - 0.25).abs() < 1e-4);
        assert!((ray.hit.v - 0.25).abs() < 1e-4);
        assert!(ray.hit.tri_index == 0);
    }

    #[test]
    fn miss_reports_e2() {
        // spec.md E2
        let mesh = Mesh::from_triangle_soup(
            vec![
                WorldPoint::new(0.0, 0.0, 0.0),
                WorldPoint::new(1.0, 0.0, 0.0),
                WorldPoint::new(0.0, 1.0, 0.0),
            ],
            vec![WorldVector::new(0.0, 0.0, 1.0)],
            [([0, 1, 2], [0, 0, 0])],
        );
        let bvh = Bvh::build(&mesh, BvhSplit::Sah);
        let mut ray = Ray::new(WorldPoint::new(2.0, 2.0, -1.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut stats = RayStats::default();
        bvh.intersect(&mesh, &mut ray, &mut stats);
        assert!(ray.hit.t == MISS_T);
    }

    #[test]
    fn build_is_idempotent() {
        let mesh = grid_mesh(15);
        let a = Bvh::build(&mesh, BvhSplit::Sah);
        let b = Bvh::build(&mesh, BvhSplit::Sah);
        assert!(a.tri_idx() == b.tri_idx());
        assert!(a.nodes_used() == b.nodes_used());
    }
}
