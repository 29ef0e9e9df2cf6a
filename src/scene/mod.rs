//! The traced scene: a [`Room`], four [`LightQuad`]s, and the mesh instances
//! placed inside it (spec.md §3 "Scene", §4.7 "Dispatcher"). Grounded on
//! `examples/original_source/template/scene.h`'s `Scene` class — walls and
//! lights are tested analytically, mesh instances through whichever
//! [`crate::accel::Index`] currently backs them, and the nearest `t` across
//! all three wins.
//!
//! `objIdx` is scene-global: walls occupy `0..6`, lights `6..10`, and each
//! [`MeshInstance`] is assigned a contiguous range above that by
//! [`Scene::new`] (see `MeshInstance::obj_base`).

pub mod light;
pub mod quad;
pub mod room;

use rand::Rng;

use crate::{
    accel::MeshInstance,
    config::CameraPreset,
    geometry::{Hit, Ray, WorldPoint, WorldVector},
};
use light::{LIGHT_COUNT, LightQuad};
use room::{HALF_SIZE, HEIGHT, Room};

const WALL_COUNT: u32 = 6;
const LIGHT_BASE: u32 = WALL_COUNT;
const INSTANCE_BASE: u32 = LIGHT_BASE + LIGHT_COUNT as u32;

/// How far short of the true light distance a shadow ray's horizon is pulled
/// in, so a hit exactly at the light surface doesn't register as its own
/// occluder (spec.md §6 "shadow ray ... t in (eps, 1-eps)").
const SHADOW_EPS: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct Scene {
    pub room: Room,
    pub lights: [LightQuad; LIGHT_COUNT],
    pub instances: Vec<MeshInstance>,
}

impl Scene {
    /// Assigns each instance a contiguous `objIdx` range above the room and
    /// lights, in iteration order.
    pub fn new(
        room: Room,
        lights: [LightQuad; LIGHT_COUNT],
        meshes: Vec<(crate::mesh::Mesh, crate::accel::Index, nalgebra::Isometry3<f32>, WorldVector)>,
    ) -> Self {
        let mut instances = Vec::with_capacity(meshes.len());
        let mut next_base = INSTANCE_BASE;
        for (mesh, index, transform, albedo) in meshes {
            let count = mesh.triangle_count() as u32;
            instances.push(MeshInstance::new(mesh, index, transform, next_base, albedo));
            next_base += count;
        }
        Scene { room, lights, instances }
    }

    /// The dispatcher's single entry point: updates `ray.hit` in place with
    /// the nearest intersection across walls, lights, and every instance.
    pub fn find_nearest(&self, ray: &mut Ray, stats: &mut crate::accel::RayStats) {
        for (i, wall) in self.room.walls.iter().enumerate() {
            if let Some(t) = wall.intersect(ray) {
                ray.hit = Hit { t, u: 0.0, v: 0.0, tri_index: crate::geometry::NO_INDEX, obj_idx: i as u32 };
            }
        }
        for (i, light) in self.lights.iter().enumerate() {
            if let Some(t) = light.quad.intersect(ray) {
                ray.hit = Hit {
                    t,
                    u: 0.0,
                    v: 0.0,
                    tri_index: crate::geometry::NO_INDEX,
                    obj_idx: LIGHT_BASE + i as u32,
                };
            }
        }
        for instance in &self.instances {
            instance.intersect(ray, stats);
        }
    }

    /// Any-hit shadow test along `direction` from `origin`, up to (but not
    /// including) `max_t`. Reuses [`Scene::find_nearest`] rather than a
    /// separate early-out traversal, trading a small amount of unnecessary
    /// work for one codepath.
    pub fn is_occluded(&self, origin: WorldPoint, direction: WorldVector, max_t: f32, stats: &mut crate::accel::RayStats) -> bool {
        let mut ray = Ray::new(origin, direction);
        ray.hit.t = max_t * (1.0 - SHADOW_EPS);
        self.find_nearest(&mut ray, stats);
        ray.hit.obj_idx != crate::geometry::NO_INDEX
    }

    pub fn get_normal(&self, obj_idx: u32, wo: &WorldVector) -> WorldVector {
        let n = if obj_idx < LIGHT_BASE {
            self.room.walls[obj_idx as usize].normal()
        } else if obj_idx < INSTANCE_BASE {
            self.lights[(obj_idx - LIGHT_BASE) as usize].quad.normal()
        } else {
            let instance = self.instance_owning(obj_idx);
            return instance.get_normal(instance.local_tri_index(obj_idx), wo);
        };
        if n.dot(wo) < 0.0 { -n } else { n }
    }

    pub fn get_albedo(&self, obj_idx: u32) -> WorldVector {
        if obj_idx < LIGHT_BASE {
            self.room.albedo[obj_idx as usize]
        } else if obj_idx < INSTANCE_BASE {
            self.lights[(obj_idx - LIGHT_BASE) as usize].emission
        } else {
            self.instance_owning(obj_idx).get_albedo()
        }
    }

    /// Whether `obj_idx` names one of the four ceiling light quads, the one
    /// case the renderer must short-circuit shading for (spec.md §4.8: a ray
    /// that hits a light directly returns its emission, not a shaded BRDF).
    pub fn is_light(&self, obj_idx: u32) -> bool {
        obj_idx >= LIGHT_BASE && obj_idx < INSTANCE_BASE
    }

    fn instance_owning(&self, obj_idx: u32) -> &MeshInstance {
        self.instances
            .iter()
            .find(|instance| instance.owns(obj_idx))
            .expect("obj_idx should belong to a wall, light, or a registered instance")
    }

    pub fn get_random_light(&self, rng: &mut impl Rng) -> usize {
        rng.random_range(0..LIGHT_COUNT)
    }

    pub fn random_point_on_light_quad(&self, light_idx: usize, rng: &mut impl Rng) -> WorldPoint {
        self.lights[light_idx].quad.sample_point(rng)
    }

    pub fn get_light_quad(&self, light_idx: usize) -> &LightQuad {
        &self.lights[light_idx]
    }

    pub fn get_light_color(&self, light_idx: usize) -> WorldVector {
        self.lights[light_idx].emission
    }

    pub fn get_light_area(&self, light_idx: usize) -> f32 {
        self.lights[light_idx].quad.area()
    }

    pub fn get_light_count(&self) -> usize {
        LIGHT_COUNT
    }

    /// The original animates its light transforms per-frame; this scene's
    /// lights are stationary, so this is a no-op kept for callers ported
    /// from the original's per-frame update loop.
    pub fn set_time(&mut self, _seconds: f32) {}

    /// Spec.md §6 `GetCameraPos(i)`: the original's own `posIdx == 1` branch
    /// falls through to `float3(0)` (origin) for every scene — evidently
    /// never finished — so the second preset here is a deliberate choice, a
    /// three-quarter corner view, rather than a port of that dead code (see
    /// DESIGN.md).
    pub fn get_camera_pos(&self, preset: CameraPreset) -> WorldPoint {
        match preset {
            CameraPreset::First => WorldPoint::new(0.0, HEIGHT * 0.4, -HALF_SIZE + 1.0),
            CameraPreset::Second => WorldPoint::new(-HALF_SIZE + 1.0, HEIGHT * 0.7, -HALF_SIZE + 1.0),
        }
    }

    pub fn get_camera_target(&self, preset: CameraPreset) -> WorldPoint {
        match preset {
            CameraPreset::First => WorldPoint::new(0.0, HEIGHT * 0.4, HALF_SIZE),
            CameraPreset::Second => WorldPoint::new(HALF_SIZE * 0.3, HEIGHT * 0.3, HALF_SIZE * 0.3),
        }
    }
}
