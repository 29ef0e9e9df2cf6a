//! Per-thread render state: an owned RNG and the per-sample shading routine.
//! Grounded on `Renderer::Trace` in
//! `examples/original_source/1. Basics/renderer.cpp`: one primary ray, one
//! next-event-estimation shadow ray toward a randomly picked light quad, and
//! (when a heat map mode is active) a sqrt-remapped intersection/traversal
//! count in place of the shaded color.

use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    accel::RayStats,
    camera::Camera,
    config::{HeatMapMode, RenderConfig},
    geometry::{ScreenBlock, ScreenPoint},
    renderer::{RenderSettings, RenderStats},
    scene::Scene,
    screen_block::ScreenBlockExt as _,
    util::Rgba,
};

/// Cap applied before the sqrt remap, matching the original's hardcoded
/// `min(maxIntersections, 200.0f)` (one ray realistically never crosses 80
/// node visits, per the original's own comment).
const HEAT_MAP_CAP: f32 = 200.0;

pub struct Worker {
    rng: SmallRng,
}

impl Worker {
    pub fn new(_worker_id: usize) -> Self {
        Self { rng: SmallRng::from_os_rng() }
    }

    pub fn render_row(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        config: &RenderConfig,
        row: &ScreenBlock,
        buffer: &mut image::RgbaImage,
        stats: &mut RenderStats,
    ) {
        for point in row.internal_points() {
            let mut pixel_sum = Rgba::new(0.0, 0.0, 0.0, 0.0);
            for _ in 0..settings.sample_count.get() {
                pixel_sum += self.render_sample(scene, camera, config, &point, stats);
            }
            let pixel = pixel_sum * (1.0 / settings.sample_count.get() as f32);

            let buffer_position = point - row.min;
            buffer.put_pixel(buffer_position.x, buffer_position.y, color_to_image(pixel));
        }
    }

    fn render_sample(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        config: &RenderConfig,
        point: &ScreenPoint,
        stats: &mut RenderStats,
    ) -> Rgba {
        let mut ray = camera.sample_ray(point, &mut self.rng);
        let mut primary_stats = RayStats::default();
        scene.find_nearest(&mut ray, &mut primary_stats);
        stats.record_primary(&primary_stats);

        if let Some(mode) = config.heat_map {
            let value = match mode {
                HeatMapMode::IntersectionTests => primary_stats.intersection_tests as f32,
                HeatMapMode::TraversalSteps => primary_stats.traversal_steps as f32,
            };
            return heat_map_color(value);
        }

        if ray.hit.is_miss() {
            return Rgba::new(0.0, 0.0, 0.0, 1.0);
        }
        if scene.is_light(ray.hit.obj_idx) {
            let emission = scene.get_albedo(ray.hit.obj_idx);
            return Rgba::new(emission.x, emission.y, emission.z, 1.0);
        }

        let shaded = self.shade(scene, &ray, stats);
        Rgba::new(shaded.x, shaded.y, shaded.z, 1.0)
    }

    /// Single-sample next-event estimation: a random light pick, a cosine-
    /// weighted-by-solid-angle contribution, and a shadow ray to occlude it.
    fn shade(
        &mut self,
        scene: &Scene,
        ray: &crate::geometry::Ray,
        stats: &mut RenderStats,
    ) -> crate::geometry::WorldVector {
        use crate::geometry::WorldVector;

        let hit_point = ray.point_at(ray.hit.t);
        let wo = -ray.direction;
        let normal = scene.get_normal(ray.hit.obj_idx, &wo);

        let light_idx = scene.get_random_light(&mut self.rng);
        let light_point = scene.random_point_on_light_quad(light_idx, &mut self.rng);
        let to_light = light_point - hit_point;
        let dist = to_light.norm();
        let l = to_light / dist;

        let light_quad = scene.get_light_quad(light_idx);
        let cos_o = (-l).dot(&light_quad.quad.normal());
        let cos_i = l.dot(&normal);
        if cos_o <= 0.0 || cos_i <= 0.0 {
            return WorldVector::zeros();
        }

        let mut shadow_stats = RayStats::default();
        let occluded = scene.is_occluded(hit_point, l, dist, &mut shadow_stats);
        stats.record_shadow(&shadow_stats);
        if occluded {
            return WorldVector::zeros();
        }

        let albedo = scene.get_albedo(ray.hit.obj_idx);
        let brdf = albedo / std::f32::consts::PI;
        let solid_angle = (scene.get_light_area(light_idx) * cos_o) / (dist * dist);
        let light_contribution = brdf.component_mul(&scene.get_light_color(light_idx));
        light_contribution * (scene.get_light_count() as f32 * solid_angle * cos_i)
    }
}

/// Remaps a heat-map sample to the original's red/green gradient: sqrt both
/// the sample and the (capped) max so a handful of very expensive rays don't
/// wash out the whole image.
fn heat_map_color(value: f32) -> Rgba {
    let capped_max = HEAT_MAP_CAP.sqrt();
    let t = (value.sqrt() / capped_max).clamp(0.0, 1.0);
    let red = crate::geometry::WorldVector::new(1.0, 0.0, 0.0);
    let green = crate::geometry::WorldVector::new(0.0, 0.8, 0.0);
    let color = red * t + green * (1.0 - t);
    Rgba::new(color.x, color.y, color.z, 1.0)
}

pub fn color_to_image(color: Rgba) -> image::Rgba<u8> {
    image::Rgba([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    #[test]
    fn heat_map_color_is_pure_green_at_zero_and_pure_red_at_cap() {
        let low = heat_map_color(0.0);
        assert!(low.g > 0.0 && low.r == 0.0);
        let high = heat_map_color(HEAT_MAP_CAP * 4.0);
        assert!(high.r > 0.9 && high.g < 0.1);
    }

    #[test]
    fn color_to_image_clamps_out_of_range_channels() {
        let pixel = color_to_image(Rgba::new(-1.0, 2.0, 0.5, 1.0));
        assert!(pixel.0[0] == 0);
        assert!(pixel.0[1] == 255);
    }
}
