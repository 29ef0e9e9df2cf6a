use crate::geometry::{Ray, WorldPoint};

/// Epsilon used both to reject near-parallel rays and as the near-plane
/// clamp on accepted hits (spec.md §4.1).
const EPSILON: f32 = 1e-4;

#[derive(Copy, Clone, Debug)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Möller-Trumbore ray/triangle test (spec.md §4.1). Returns `None` when the
/// ray is (near) parallel to the triangle's plane, the barycentric coordinates
/// fall outside the triangle, or the hit distance isn't in `(EPSILON, ray.hit.t)`.
pub fn intersect_triangle(ray: &Ray, v0: &WorldPoint, v1: &WorldPoint, v2: &WorldPoint) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < EPSILON {
        return None; // ray parallel to the triangle's plane
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t > EPSILON && t < ray.hit.t {
        Some(TriangleHit { t, u, v })
    } else {
        None
    }
}
