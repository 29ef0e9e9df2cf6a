use crate::geometry::WorldPoint;

/// Axis-aligned bounding box. `Default` is the empty box (`min = +inf`, `max = -inf`)
/// so that growing an empty box by any point yields that point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb {
            min: WorldPoint::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: WorldPoint::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }
}

impl Aabb {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = WorldPoint>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.grow(p);
        }
        b
    }

    /// Expands the box to include `point`.
    pub fn grow(&mut self, point: WorldPoint) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Expands the box to include `other` in its entirety.
    pub fn grow_aabb(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut b = *self;
        b.grow_aabb(other);
        b
    }

    pub fn extent(&self) -> nalgebra::Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> WorldPoint {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Half the surface area (`e.x*e.y + e.y*e.z + e.z*e.x`), used only for
    /// relative SAH costs (spec.md §4.1) — the factor of two cancels out of every
    /// comparison, so it is never applied.
    pub fn area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let e = self.extent();
        e.x * e.y + e.y * e.z + e.z * e.x
    }

    /// Index (0, 1 or 2) of the longest axis, used by the BVH's median split.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn empty_box_has_zero_area() {
        assert!(Aabb::empty().area() == 0.0);
    }

    #[test]
    fn grow_by_single_point_yields_degenerate_box_at_that_point() {
        let mut b = Aabb::empty();
        let p = WorldPoint::new(1.0, 2.0, 3.0);
        b.grow(p);
        assert!(b.min == p);
        assert!(b.max == p);
        assert!(b.area() == 0.0);
    }

    #[test]
    fn union_of_two_boxes_is_tight() {
        let a = Aabb::from_points([WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0)]);
        let b = Aabb::from_points([WorldPoint::new(2.0, -1.0, 0.5), WorldPoint::new(3.0, 0.0, 0.5)]);
        let u = a.union(&b);
        assert!(u.min == WorldPoint::new(0.0, -1.0, 0.0));
        assert!(u.max == WorldPoint::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn area_of_unit_cube() {
        let b = Aabb::from_points([WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0)]);
        // half surface area of a unit cube: 1*1 + 1*1 + 1*1 = 3
        assert!((b.area() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn longest_axis_picks_the_stretched_one() {
        let b = Aabb::from_points([WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 5.0, 2.0)]);
        assert!(b.longest_axis() == 1);
    }
}
