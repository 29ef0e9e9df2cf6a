//! Area lights (spec.md §3 "Light quad"). Four small emissive quads set into
//! the ceiling, matching the original's `GetLightCount() == 4` and its
//! `(24, 24, 22)` emission (`examples/original_source/template/scene.h`).

use crate::{geometry::WorldVector, scene::quad::Quad, scene::room::HEIGHT};

pub const LIGHT_COUNT: usize = 4;
pub const LIGHT_EMISSION: WorldVector = WorldVector::new(24.0, 24.0, 22.0);

#[derive(Clone, Copy, Debug)]
pub struct LightQuad {
    pub quad: Quad,
    pub emission: WorldVector,
}

impl LightQuad {
    /// Four quadrant patches set a hair below the ceiling, each separated
    /// from its neighbors by a margin so they read as distinct lights.
    pub fn ceiling_array() -> [LightQuad; LIGHT_COUNT] {
        const PATCH: f32 = 3.0;
        const GAP: f32 = 0.6;
        const Y: f32 = HEIGHT - 0.01;
        let centers = [(-GAP - PATCH, -GAP - PATCH), (GAP, -GAP - PATCH), (-GAP - PATCH, GAP), (GAP, GAP)];
        centers.map(|(cx, cz)| LightQuad {
            quad: Quad {
                axis: 1,
                pos: Y,
                min_a: cx,
                max_a: cx + PATCH,
                min_b: cz,
                max_b: cz + PATCH,
                normal_sign: -1.0,
            },
            emission: LIGHT_EMISSION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn every_light_patch_sits_below_the_ceiling() {
        for light in LightQuad::ceiling_array() {
            assert!(light.quad.pos < HEIGHT);
            assert!(light.quad.area() > 0.0);
        }
    }
}
