//! Runtime configuration (spec.md §6 "Runtime configuration"): the knobs the
//! original toggles through Dear ImGui checkboxes/radio buttons
//! (`examples/original_source/1. Basics/renderer.cpp::UI`), here a plain
//! `Copy` struct the CLI parses once at startup instead of a live UI binding.

use crate::accel::AccelStructKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeatMapMode {
    IntersectionTests,
    TraversalSteps,
}

/// `SceneIdx` from spec.md §6: single-mesh vs. two-mesh scenario.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SceneIdx {
    #[default]
    SingleMesh,
    TwoMeshes,
}

/// Which of the original's two hardcoded camera placements to use
/// (`examples/original_source/1. Basics/renderer.cpp::UI`, "CamPos 1"/"CamPos 2").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CameraPreset {
    #[default]
    First,
    Second,
}

#[derive(Copy, Clone, Debug)]
pub struct RenderConfig {
    pub accel: AccelStructKind,
    pub heat_map: Option<HeatMapMode>,
    pub scene_idx: SceneIdx,
    pub camera_preset: CameraPreset,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            accel: AccelStructKind::default(),
            heat_map: None,
            scene_idx: SceneIdx::default(),
            camera_preset: CameraPreset::default(),
        }
    }
}
