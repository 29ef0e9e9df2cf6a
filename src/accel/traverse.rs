//! Iterative, explicit-stack traversal (spec.md §4.6), shared by the BVH and
//! k-D tree (binary fanout) and by the octree (eight-way fanout). Recursive
//! call-stack traversal is deliberately avoided per spec.md §9 ("recursive
//! traversal -> explicit stack").

use arrayvec::ArrayVec;

use crate::{
    accel::{RayStats, arena::NodeArena},
    geometry::{Hit, MISS_T, Ray, intersect_aabb, intersect_triangle},
    mesh::Mesh,
};

/// Depth bound for the explicit traversal stack (spec.md §4.6: "depth bound
/// ~ 64"). A well-formed build never comes close to this; see
/// [`push_or_drop`] for what happens if one somehow does.
const STACK_DEPTH: usize = 64;

fn test_leaf_triangles(mesh: &Mesh, tri_idx: &[u32], first: u32, count: u32, ray: &mut Ray, stats: &mut RayStats) {
    for k in 0..count {
        let tri_index = tri_idx[(first + k) as usize];
        stats.intersection_tests += 1;
        let (v0, v1, v2) = mesh.triangle_vertices(tri_index);
        if let Some(hit) = intersect_triangle(ray, &v0, &v1, &v2) {
            let tri = mesh.triangle(tri_index);
            ray.hit = Hit {
                t: hit.t,
                u: hit.u,
                v: hit.v,
                tri_index,
                obj_idx: tri.obj_idx,
            };
        }
    }
}

/// A stack overflow is the one hard invariant spec.md §7 calls out: the
/// builder is expected to keep depth within `STACK_DEPTH`. If it somehow
/// doesn't, debug builds assert loudly and release builds silently drop the
/// overflowing child rather than corrupt the traversal.
fn push_or_drop(stack: &mut ArrayVec<u32, STACK_DEPTH>, idx: u32) {
    if stack.try_push(idx).is_err() {
        debug_assert!(false, "acceleration structure traversal stack overflow");
    }
}

/// Traverses a binary (BVH or k-D tree) arena front-to-back, updating
/// `ray.hit` with the nearest surviving intersection.
pub fn traverse_binary(nodes: &NodeArena, tri_idx: &[u32], root: u32, mesh: &Mesh, ray: &mut Ray, stats: &mut RayStats) {
    stats.intersection_tests += 1;
    let root_node = nodes.get(root);
    if intersect_aabb(ray, &root_node.aabb_min, &root_node.aabb_max) >= MISS_T {
        return;
    }

    let mut stack: ArrayVec<u32, STACK_DEPTH> = ArrayVec::new();
    let mut node_idx = root;
    loop {
        let node = nodes.get(node_idx);
        if node.is_leaf() {
            test_leaf_triangles(mesh, tri_idx, node.first_child, node.tri_count, ray, stats);
        } else {
            stats.traversal_steps += 1;
            let (c0, c1) = (node.first_child, node.first_child + 1);
            let (n0, n1) = (nodes.get(c0), nodes.get(c1));
            stats.intersection_tests += 2;
            let t0 = intersect_aabb(ray, &n0.aabb_min, &n0.aabb_max);
            let t1 = intersect_aabb(ray, &n1.aabb_min, &n1.aabb_max);
            let (near, far, near_t, far_t) = if t0 <= t1 { (c0, c1, t0, t1) } else { (c1, c0, t1, t0) };

            if near_t < MISS_T {
                if far_t < MISS_T {
                    push_or_drop(&mut stack, far);
                }
                node_idx = near;
                continue;
            } else if far_t < MISS_T {
                node_idx = far;
                continue;
            }
        }

        match stack.pop() {
            Some(next) => node_idx = next,
            None => return,
        }
    }
}

/// Traverses an eight-way octree arena, otherwise identical to
/// [`traverse_binary`]: descend nearest-first, push the rest far-to-near.
pub fn traverse_octree(nodes: &NodeArena, tri_idx: &[u32], root: u32, mesh: &Mesh, ray: &mut Ray, stats: &mut RayStats) {
    stats.intersection_tests += 1;
    let root_node = nodes.get(root);
    if intersect_aabb(ray, &root_node.aabb_min, &root_node.aabb_max) >= MISS_T {
        return;
    }

    let mut stack: ArrayVec<u32, STACK_DEPTH> = ArrayVec::new();
    let mut node_idx = root;
    loop {
        let node = nodes.get(node_idx);
        if node.is_leaf() {
            test_leaf_triangles(mesh, tri_idx, node.first_child, node.tri_count, ray, stats);
        } else {
            stats.traversal_steps += 1;
            let mut hits: ArrayVec<(u32, f32), 8> = ArrayVec::new();
            for i in 0..8u32 {
                let child_idx = node.first_child + i;
                let child = nodes.get(child_idx);
                stats.intersection_tests += 1;
                let t = intersect_aabb(ray, &child.aabb_min, &child.aabb_max);
                if t < MISS_T {
                    hits.push((child_idx, t));
                }
            }
            hits.sort_unstable_by(|a, b| b.1.total_cmp(&a.1)); // far-to-near

            if let Some((nearest, _)) = hits.pop() {
                for (idx, _) in hits.into_iter() {
                    push_or_drop(&mut stack, idx);
                }
                node_idx = nearest;
                continue;
            }
        }

        match stack.pop() {
            Some(next) => node_idx = next,
            None => return,
        }
    }
}
