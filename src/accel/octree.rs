//! Octree builder (spec.md §4.5). Fixed eight-way fanout, split at the
//! parent box's geometric center rather than any SAH-derived position;
//! children are classified into octants by comparing each triangle's
//! centroid against that center on all three axes at once
//! (`b = (x>=sx)*4 + (y>=sy)*2 + (z>=sz)`).

use crate::{
    accel::{
        RayStats,
        arena::{Node, NodeArena},
        traverse,
    },
    geometry::{Aabb, NO_INDEX, Ray, WorldPoint},
    mesh::Mesh,
};

/// Below this many triangles a node always becomes a leaf, matching the
/// BVH median split's `triCount <= 2` terminal condition in spirit.
const MIN_LEAF_TRIS: usize = 2;

#[derive(Clone, Debug)]
pub struct Octree {
    nodes: NodeArena,
    tri_idx: Vec<u32>,
    root: u32,
}

impl Octree {
    pub fn build(mesh: &Mesh) -> Self {
        let n = mesh.triangle_count();
        let mut oct = Octree {
            nodes: NodeArena::with_capacity(2 * n.max(1)),
            tri_idx: Vec::with_capacity(n),
            root: 0,
        };
        oct.root = oct.nodes.push(Node::default());

        if n == 0 {
            return oct;
        }

        let all: Vec<u32> = (0..n as u32).collect();
        let bounds = tight_aabb(mesh, &all);
        oct.subdivide_into(mesh, oct.root, &all, &bounds);
        oct
    }

    fn subdivide_into(&mut self, mesh: &Mesh, node_idx: u32, tris: &[u32], bounds: &Aabb) {
        {
            let node = self.nodes.get_mut(node_idx);
            node.aabb_min = bounds.min;
            node.aabb_max = bounds.max;
        }

        if tris.len() <= MIN_LEAF_TRIS {
            self.make_leaf(node_idx, tris);
            return;
        }

        let center = bounds.center();
        let mut buckets: [Vec<u32>; 8] = Default::default();
        for &ti in tris {
            let c = mesh.triangle(ti).centroid;
            let b = octant_of(&c, &center);
            buckets[b].push(ti);
        }

        // spec.md §4.5: abort the split (stay a leaf) once too many octants
        // collapse to empty — a fixed 8-way split bought nothing that time.
        let empty_octants = buckets.iter().filter(|b| b.is_empty()).count();
        let largest = buckets.iter().map(Vec::len).max().unwrap_or(0);
        if empty_octants >= 4 || largest == tris.len() {
            self.make_leaf(node_idx, tris);
            return;
        }

        let children = self.nodes.alloc(8);
        {
            let node = self.nodes.get_mut(node_idx);
            node.first_child = children;
            node.tri_count = 0;
        }
        for (octant, bucket) in buckets.into_iter().enumerate() {
            let child_bounds = octant_bounds(bounds, &center, octant);
            self.subdivide_into(mesh, children + octant as u32, &bucket, &child_bounds);
        }
    }

    fn make_leaf(&mut self, node_idx: u32, tris: &[u32]) {
        if tris.is_empty() {
            let node = self.nodes.get_mut(node_idx);
            node.first_child = NO_INDEX;
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
        traverse::traverse_octree(&self.nodes, &self.tri_idx, self.root, mesh, ray, stats);
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

/// `b = (x>=sx)*4 + (y>=sy)*2 + (z>=sz)`, spec.md §4.5 exactly.
fn octant_of(p: &WorldPoint, center: &WorldPoint) -> usize {
    let mut b = 0usize;
    if p.x >= center.x {
        b |= 4;
    }
    if p.y >= center.y {
        b |= 2;
    }
    if p.z >= center.z {
        b |= 1;
    }
    b
}

fn octant_bounds(parent: &Aabb, center: &WorldPoint, octant: usize) -> Aabb {
    let mut min = parent.min;
    let mut max = parent.max;
    if octant & 4 != 0 {
        min.x = center.x;
    } else {
        max.x = center.x;
    }
    if octant & 2 != 0 {
        min.y = center.y;
    } else {
        max.y = center.y;
    }
    if octant & 1 != 0 {
        min.z = center.z;
    } else {
        max.z = center.z;
    }
    Aabb { min, max }
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
