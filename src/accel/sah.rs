//! Shared surface-area-heuristic split search (spec.md §4.3/§4.4): evaluate
//! every axis x every candidate centroid within a node and keep the cheapest.
//! Used verbatim by the BVH's SAH variant and by the k-D tree, whose split
//! *selection* is centroid-based even though its *partition* afterwards
//! straddles triangles across both children (spec.md §4.4).

use crate::{geometry::Aabb, mesh::Mesh};

/// Returns `(axis, split_pos)` of the cheapest candidate split, or `None` if
/// no candidate improves on leaving the node unsplit (`cost >= triCount *
/// parentArea`, spec.md §4.3). Ties keep the first-encountered candidate
/// (lower axis, then lower triangle index), matching the stable iteration
/// order below.
pub fn best_split(mesh: &Mesh, tris: &[u32], parent_area: f32) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32, f32)> = None;

    for axis in 0..3 {
        for &candidate_tri in tris {
            let split_pos = mesh.triangle(candidate_tri).centroid[axis];

            let mut left_count = 0usize;
            let mut right_count = 0usize;
            let mut left_box = Aabb::empty();
            let mut right_box = Aabb::empty();

            for &ti in tris {
                let (v0, v1, v2) = mesh.triangle_vertices(ti);
                if mesh.triangle(ti).centroid[axis] < split_pos {
                    left_count += 1;
                    left_box.grow(v0);
                    left_box.grow(v1);
                    left_box.grow(v2);
                } else {
                    right_count += 1;
                    right_box.grow(v0);
                    right_box.grow(v1);
                    right_box.grow(v2);
                }
            }

            let cost = left_count as f32 * left_box.area() + right_count as f32 * right_box.area();
            if best.is_none_or(|(_, _, best_cost)| cost < best_cost) {
                best = Some((axis, split_pos, cost));
            }
        }
    }

    let (axis, split_pos, cost) = best?;
    let parent_cost = tris.len() as f32 * parent_area;
    if cost >= parent_cost { None } else { Some((axis, split_pos)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{WorldPoint, WorldVector};
    use assert2::assert;

    fn two_far_apart_triangles() -> Mesh {
        Mesh::from_triangle_soup(
            vec![
                WorldPoint::new(0.0, 0.0, 0.0),
                WorldPoint::new(1.0, 0.0, 0.0),
                WorldPoint::new(0.0, 1.0, 0.0),
                WorldPoint::new(10.0, 0.0, 0.0),
                WorldPoint::new(11.0, 0.0, 0.0),
                WorldPoint::new(10.0, 1.0, 0.0),
            ],
            vec![WorldVector::new(0.0, 0.0, 1.0)],
            [([0, 1, 2], [0, 0, 0]), ([3, 4, 5], [0, 0, 0])],
        )
    }

    #[test]
    fn finds_a_clean_split_between_two_separated_clusters() {
        let mesh = two_far_apart_triangles();
        let tris = [0u32, 1u32];
        let parent = mesh.bounds().area();
        let (axis, pos) = best_split(&mesh, &tris, parent).expect("should find a split");
        assert!(axis == 0);
        assert!(pos > 1.0 && pos < 10.0);
    }

    #[test]
    fn single_triangle_has_no_improving_split() {
        let mesh = two_far_apart_triangles();
        let tris = [0u32];
        let parent_area = mesh.triangle_vertices(0).0.coords.norm().max(1.0);
        // A single triangle's own tight box has the same area as "parent" by
        // construction below; no split can beat leaving it alone.
        let b = Aabb::from_points([
            mesh.triangle_vertices(0).0,
            mesh.triangle_vertices(0).1,
            mesh.triangle_vertices(0).2,
        ]);
        let _ = parent_area;
        assert!(best_split(&mesh, &tris, b.area()).is_none());
    }
}
