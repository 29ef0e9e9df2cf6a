//! The six walls enclosing the scene (spec.md §3 "Room"), a dimension-
//! simplified stand-in for the original's `plane[6]` (see DESIGN.md for why
//! the literal constants weren't ported: they're tied to the original's
//! SIMD-packed `Plane` layout, not to anything spec.md requires). Walls are
//! diffuse, axis-aligned, and never move once built.

use crate::{geometry::WorldVector, scene::quad::Quad};

/// Half the room's width/depth; the room spans `[-HALF_SIZE, HALF_SIZE]` on
/// x and z, and `[0, HEIGHT]` on y.
pub const HALF_SIZE: f32 = 10.0;
pub const HEIGHT: f32 = 20.0;

const WHITE: WorldVector = WorldVector::new(0.75, 0.75, 0.75);
const RED: WorldVector = WorldVector::new(0.75, 0.1, 0.1);
const GREEN: WorldVector = WorldVector::new(0.1, 0.75, 0.1);

#[derive(Clone, Debug)]
pub struct Room {
    pub walls: [Quad; 6],
    pub albedo: [WorldVector; 6],
}

impl Room {
    /// Cornell-box layout: floor, ceiling, back, front, left (red), right
    /// (green), matching the classic arrangement the original's `scene.h`
    /// Cornell room also uses.
    pub fn cornell_box() -> Self {
        let walls = [
            // floor
            Quad { axis: 1, pos: 0.0, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: -HALF_SIZE, max_b: HALF_SIZE, normal_sign: 1.0 },
            // ceiling
            Quad { axis: 1, pos: HEIGHT, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: -HALF_SIZE, max_b: HALF_SIZE, normal_sign: -1.0 },
            // back wall
            Quad { axis: 2, pos: HALF_SIZE, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: 0.0, max_b: HEIGHT, normal_sign: -1.0 },
            // front wall (behind the camera)
            Quad { axis: 2, pos: -HALF_SIZE, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: 0.0, max_b: HEIGHT, normal_sign: 1.0 },
            // left wall
            Quad { axis: 0, pos: -HALF_SIZE, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: 0.0, max_b: HEIGHT, normal_sign: 1.0 },
            // right wall
            Quad { axis: 0, pos: HALF_SIZE, min_a: -HALF_SIZE, max_a: HALF_SIZE, min_b: 0.0, max_b: HEIGHT, normal_sign: -1.0 },
        ];
        let albedo = [WHITE, WHITE, WHITE, WHITE, RED, GREEN];
        Room { walls, albedo }
    }
}

impl Default for Room {
    fn default() -> Self {
        Room::cornell_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn every_wall_normal_points_into_the_room() {
        let room = Room::cornell_box();
        let center = crate::geometry::WorldPoint::new(0.0, HEIGHT * 0.5, 0.0);
        for wall in &room.walls {
            let to_center = center - wall.center();
            assert!(wall.normal().dot(&to_center) > 0.0);
        }
    }
}
