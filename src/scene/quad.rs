//! Axis-aligned rectangle, the shared analytic primitive backing both the
//! room's six walls and its four light quads (spec.md §3 "Room", "Light
//! quad"; grounded on the `Plane`/`Quad` pair in
//! `examples/original_source/template/scene.h`, collapsed into one type
//! since a Cornell-box wall and a light quad are the same shape).

use rand::Rng;

use crate::geometry::{EPSILON, Ray, WorldPoint, WorldVector};

/// The two axes spanning the quad, always the two different from `axis`, in
/// ascending order (e.g. `axis == 1` spans `x` then `z`).
fn other_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Quad {
    /// Which axis the quad's plane is perpendicular to (0=x, 1=y, 2=z).
    pub axis: usize,
    /// The quad's plane is at `coordinate[axis] == pos`.
    pub pos: f32,
    pub min_a: f32,
    pub max_a: f32,
    pub min_b: f32,
    pub max_b: f32,
    /// +1.0 or -1.0: which way along `axis` the quad's normal faces.
    pub normal_sign: f32,
}

impl Quad {
    pub fn normal(&self) -> WorldVector {
        let mut n = WorldVector::zeros();
        n[self.axis] = self.normal_sign;
        n
    }

    pub fn area(&self) -> f32 {
        (self.max_a - self.min_a) * (self.max_b - self.min_b)
    }

    pub fn center(&self) -> WorldPoint {
        let (a, b) = other_axes(self.axis);
        let mut p = WorldPoint::origin();
        p[self.axis] = self.pos;
        p[a] = (self.min_a + self.max_a) * 0.5;
        p[b] = (self.min_b + self.max_b) * 0.5;
        p
    }

    /// Uniformly samples a world point on the quad's surface, for shadow-ray
    /// area-light sampling (spec.md §6 "RandomPointOnLightQuad").
    pub fn sample_point(&self, rng: &mut impl Rng) -> WorldPoint {
        let (a, b) = other_axes(self.axis);
        let mut p = WorldPoint::origin();
        p[self.axis] = self.pos;
        p[a] = rng.random_range(self.min_a..=self.max_a);
        p[b] = rng.random_range(self.min_b..=self.max_b);
        p
    }

    /// Returns the hit distance if `ray` crosses the quad's rectangle closer
    /// than its current best hit, `None` otherwise.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction[self.axis];
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (self.pos - ray.origin[self.axis]) / denom;
        if t <= EPSILON || t >= ray.hit.t {
            return None;
        }
        let point = ray.point_at(t);
        let (a, b) = other_axes(self.axis);
        if point[a] < self.min_a || point[a] > self.max_a || point[b] < self.min_b || point[b] > self.max_b {
            return None;
        }
        Some(t)
    }
}
