//! The pixel loop (spec.md §1 "out of core... we specify only the query
//! entry points the renderer needs"): fires a primary ray per pixel sample
//! through [`crate::Scene::find_nearest`], shades with one next-event-
//! estimation light sample, and accumulates into an RGBA image. Grounded on
//! the teacher's `renderer/machinery.rs` work-queue shape, adapted from
//! per-tile to per-row units (spec.md §5 "distributes rows across worker
//! threads").

mod machinery;
mod worker;

pub use crate::renderer::machinery::{RenderProgress, render};

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    /// Samples per pixel; each sample fires one primary ray and (unless it
    /// misses, or lands directly on a light) one shadow ray toward a
    /// randomly sampled light quad (spec.md §4.8).
    pub sample_count: std::num::NonZeroU32,
}

/// Per-thread accumulation of the primary/shadow-ray counters spec.md §5
/// calls out as "caller-owned accumulators", split the way the original's
/// `Renderer::Trace` keeps `intersectionTestsPrimary`/`...Shadow` apart
/// (`examples/original_source/1. Basics/renderer.cpp`).
#[derive(Clone, Debug, Default)]
pub struct RenderStats {
    pub primary_tests: crate::util::Stats,
    pub primary_steps: crate::util::Stats,
    pub shadow_tests: crate::util::Stats,
    pub shadow_steps: crate::util::Stats,
}

impl RenderStats {
    pub fn record_primary(&mut self, stats: &crate::accel::RayStats) {
        self.primary_tests.add_sample(stats.intersection_tests as usize);
        self.primary_steps.add_sample(stats.traversal_steps as usize);
    }

    pub fn record_shadow(&mut self, stats: &crate::accel::RayStats) {
        self.shadow_tests.add_sample(stats.intersection_tests as usize);
        self.shadow_steps.add_sample(stats.traversal_steps as usize);
    }

    pub fn merge(&self, other: &Self) -> Self {
        RenderStats {
            primary_tests: self.primary_tests.merge(&other.primary_tests),
            primary_steps: self.primary_steps.merge(&other.primary_steps),
            shadow_tests: self.shadow_tests.merge(&other.shadow_tests),
            shadow_steps: self.shadow_steps.merge(&other.shadow_steps),
        }
    }
}
