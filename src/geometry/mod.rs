//! Scalar geometric primitives shared by every acceleration structure: points,
//! vectors, an axis-aligned box, and the ray that gets fired through all three.

mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;

pub use aabb::Aabb;
pub use ray_box_intersection::intersect_aabb;
pub use ray_triangle_intersection::intersect_triangle;

pub type FloatType = f32;

/// General-purpose tolerance for geometric comparisons outside the
/// intersection kernels (which have their own, tighter epsilons).
pub const EPSILON: FloatType = 1e-6;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = Aabb;

/// Screen-space pixel coordinate, consumed by the renderer's row work queue.
pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

/// A half-open rectangle of pixels (`min` inclusive, `max` exclusive). The
/// renderer's work queue hands these out one scanline at a time (spec.md §5
/// "distributes rows across worker threads"), but the type itself doesn't
/// assume that shape — [`crate::screen_block::ScreenBlockExt::row_ordering`]
/// is what constrains it to single rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenBlock {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenBlock {
    pub fn with_size(min: ScreenPoint, size: &ScreenSize) -> Self {
        ScreenBlock { min, max: ScreenPoint::new(min.x + size.x, min.y + size.y) }
    }

    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn area(&self) -> u32 {
        if self.is_empty() { 0 } else { self.width() * self.height() }
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// Reserved "no hit" distance. Downstream code compares against this sentinel
/// directly, never via `is_finite`/NaN checks.
pub const MISS_T: f32 = 1e30;

/// Sentinel index meaning "no triangle" / "no object".
pub const NO_INDEX: u32 = u32::MAX;

/// A primary or shadow ray, carrying its own best-so-far hit record.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    pub direction: WorldVector,
    /// Componentwise reciprocal of `direction`, precomputed once for slab tests.
    pub inv_direction: WorldVector,
    pub hit: Hit,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let inv_direction = WorldVector::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        Ray {
            origin,
            direction,
            inv_direction,
            hit: Hit::default(),
        }
    }

    pub fn point_at(&self, t: f32) -> WorldPoint {
        self.origin + self.direction * t
    }
}

/// Best-so-far intersection record. `t >= MISS_T` means "no hit yet".
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub tri_index: u32,
    pub obj_idx: u32,
}

impl Hit {
    pub fn is_miss(&self) -> bool {
        self.t >= MISS_T
    }
}

impl Default for Hit {
    fn default() -> Self {
        Hit {
            t: MISS_T,
            u: 0.0,
            v: 0.0,
            tri_index: NO_INDEX,
            obj_idx: NO_INDEX,
        }
    }
}
