use crate::geometry::{MISS_T, Ray, WorldPoint};

/// Ray/AABB slab test (spec.md §4.1). Returns the near intersection distance, or
/// `MISS_T` if the box is missed, behind the ray, or farther than the ray's
/// current best hit.
pub fn intersect_aabb(ray: &Ray, bmin: &WorldPoint, bmax: &WorldPoint) -> f32 {
    let tx1 = (bmin.x - ray.origin.x) * ray.inv_direction.x;
    let tx2 = (bmax.x - ray.origin.x) * ray.inv_direction.x;
    let mut tmin = tx1.min(tx2);
    let mut tmax = tx1.max(tx2);

    let ty1 = (bmin.y - ray.origin.y) * ray.inv_direction.y;
    let ty2 = (bmax.y - ray.origin.y) * ray.inv_direction.y;
    tmin = tmin.max(ty1.min(ty2));
    tmax = tmax.min(ty1.max(ty2));

    let tz1 = (bmin.z - ray.origin.z) * ray.inv_direction.z;
    let tz2 = (bmax.z - ray.origin.z) * ray.inv_direction.z;
    tmin = tmin.max(tz1.min(tz2));
    tmax = tmax.min(tz1.max(tz2));

    if tmax >= tmin && tmin < ray.hit.t && tmax > 0.0 {
        tmin
    } else {
        MISS_T
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WorldVector;
    use assert2::assert;
    use test_case::test_case;

    fn unit_box() -> (WorldPoint, WorldPoint) {
        (WorldPoint::new(-1.0, -1.0, -1.0), WorldPoint::new(1.0, 1.0, 1.0))
    }

    #[test_case(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::new(0.0, 0.0, 1.0) => true; "straight hit")]
    #[test_case(WorldPoint::new(5.0, 5.0, -5.0), WorldVector::new(0.0, 0.0, 1.0) => false; "parallel miss")]
    #[test_case(WorldPoint::new(0.0, 0.0, 5.0), WorldVector::new(0.0, 0.0, 1.0) => false; "box is behind the ray")]
    fn hit_or_miss(origin: WorldPoint, direction: WorldVector) -> bool {
        let (bmin, bmax) = unit_box();
        let ray = Ray::new(origin, direction);
        intersect_aabb(&ray, &bmin, &bmax) < MISS_T
    }

    #[test]
    fn grazing_edge_is_a_non_strict_hit() {
        // spec.md E3: a ray tangent to a face must still report tmin == tmax as a hit.
        let (bmin, bmax) = unit_box();
        let ray = Ray::new(WorldPoint::new(1.0, 1.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));
        let t = intersect_aabb(&ray, &bmin, &bmax);
        assert!((t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn a_closer_existing_hit_prunes_the_box() {
        let (bmin, bmax) = unit_box();
        let mut ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));
        ray.hit.t = 2.0; // closer than the box's near face at t=4
        assert!(intersect_aabb(&ray, &bmin, &bmax) == MISS_T);
    }
}
