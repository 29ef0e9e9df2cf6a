//! k-D tree builder (spec.md §4.4). Binary, sibling AABBs tile the parent
//! along one axis with no spatial overlap. Split *selection* reuses the same
//! SAH search as the BVH; the *partition* afterwards is vertex-based so that
//! any triangle straddling the plane is referenced by both children — the
//! correctness-preserving resolution of the spec.md §9 "open question"
//! (centroid-only partition leaks hits near the plane).
//!
//! Because a triangle can land in both children, `tri_idx` is not one
//! permutation of `[0, nT)` the way the BVH's is: it is built by appending
//! each leaf's (possibly duplicated) triangle list as that leaf is created,
//! rather than partitioned in place like the BVH's array. `nodes.alloc(2)`
//! still reserves the child slots up front so they stay contiguous.

use crate::{
    accel::{
        RayStats,
        arena::{Node, NodeArena},
        sah, traverse,
    },
    geometry::{Aabb, Ray},
    mesh::Mesh,
};

#[derive(Clone, Debug)]
pub struct KdTree {
    nodes: NodeArena,
    tri_idx: Vec<u32>,
    root: u32,
}

impl KdTree {
    pub fn build(mesh: &Mesh) -> Self {
        let n = mesh.triangle_count();
        // spec.md §4.4: straddling triangles can appear in both children, so
        // tri_idx must be sized beyond nT; a 2x factor covers the tested
        // scenes.
        let mut kd = KdTree {
            nodes: NodeArena::with_capacity(2 * n.max(1)),
            tri_idx: Vec::with_capacity(2 * n.max(1)),
            root: 0,
        };
        kd.root = kd.nodes.push(Node::default());

        if n == 0 {
            return kd;
        }

        let all: Vec<u32> = (0..n as u32).collect();
        let bounds = tight_aabb(mesh, &all);
        kd.subdivide_into(mesh, kd.root, &all, &bounds);
        kd
    }

    fn subdivide_into(&mut self, mesh: &Mesh, node_idx: u32, tris: &[u32], bounds: &Aabb) {
        {
            let node = self.nodes.get_mut(node_idx);
            node.aabb_min = bounds.min;
            node.aabb_max = bounds.max;
        }

        let split = if tris.len() <= 1 { None } else { sah::best_split(mesh, tris, bounds.area()) };
        let Some((axis, split_pos)) = split else {
            self.make_leaf(node_idx, tris);
            return;
        };

        let mut left = Vec::new();
        let mut right = Vec::new();
        for &ti in tris {
            let (v0, v1, v2) = mesh.triangle_vertices(ti);
            let lo = v0[axis].min(v1[axis]).min(v2[axis]);
            let hi = v0[axis].max(v1[axis]).max(v2[axis]);
            if lo < split_pos {
                left.push(ti);
            }
            if hi >= split_pos {
                right.push(ti);
            }
        }

        if left.is_empty() || right.is_empty() || (left.len() == tris.len() && right.len() == tris.len()) {
            self.make_leaf(node_idx, tris);
            return;
        }

        let mut left_bounds = *bounds;
        left_bounds.max[axis] = split_pos;
        let mut right_bounds = *bounds;
        right_bounds.min[axis] = split_pos;

        let children = self.nodes.alloc(2);
        {
            let node = self.nodes.get_mut(node_idx);
            node.first_child = children;
            node.tri_count = 0;
        }
        self.subdivide_into(mesh, children, &left, &left_bounds);
        self.subdivide_into(mesh, children + 1, &right, &right_bounds);
    }

    fn make_leaf(&mut self, node_idx: u32, tris: &[u32]) {
        if tris.is_empty() {
            let node = self.nodes.get_mut(node_idx);
            node.first_child = crate::geometry::NO_INDEX;
            node.tri_count = 0;
            return;
        }
        let first = self.tri_idx.len() as u32;
        self.tri_idx.extend_from_slice(tris);
        let node = self.nodes.get_mut(node_idx);
        node.first_child = first;
        node.tri_count = tris.len() as u32;
    }

    pub fn intersect(&self, mesh: &Mesh, ray: &mut Ray, stats: &mut RayStats) {
        if mesh.is_empty() {
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

    #[cfg(test)]
    pub(crate) fn node(&self, idx: u32) -> &Node {
        self.nodes.get(idx)
    }

    #[cfg(test)]
    pub(crate) fn tri_idx(&self) -> &[u32] {
        &self.tri_idx
    }
}

fn tight_aabb(mesh: &Mesh, tri_idx: &[u32]) -> Aabb {
    let mut b = Aabb::empty();
    for &ti in tri_idx {
        let (v0, v1, v2) = mesh.triangle_vertices(ti);
        b.grow(v0);
        b.grow(v1);
        b.grow(v2);
    }
    b
}
