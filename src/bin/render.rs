//! Command-line entry point (spec.md §6 external interfaces, SPEC_FULL.md §1.1
//! "Ambient stack / CLI"): builds a camera and scene, runs [`triaccel::render`],
//! writes the result to a PNG, and reports per-thread ray statistics through an
//! `indicatif` progress bar, built the way the teacher's own `cli.rs` is — no
//! argument-parsing crate, just a handful of named flags read off `env::args`.

use std::{num::NonZeroU32, time::Duration};

use anyhow::Context as _;
use indicatif::ProgressBar;

use triaccel::{
    Camera, RenderConfig, RenderSettings, Scene,
    accel::{AccelStructKind, Index},
    config::{CameraPreset, HeatMapMode, SceneIdx},
    geometry::{ScreenSize, WorldPoint, WorldVector},
    mesh::Mesh,
    render,
    scene::{light::LightQuad, room::Room},
};

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 1024;
const DEFAULT_SAMPLES: u32 = 16;
const DEFAULT_OBJ_PATH: &str = "data/teapot.obj";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse(std::env::args().skip(1))?;

    let mesh = Mesh::load_obj(&args.obj_path);
    if mesh.is_empty() {
        log::warn!("{} produced an empty mesh; rendering an empty room", args.obj_path);
    }
    let index = Index::build(&mesh, args.config.accel);

    let mut meshes = vec![(mesh, index, nalgebra::Isometry3::identity(), WorldVector::new(0.7, 0.7, 0.7))];
    if args.config.scene_idx == SceneIdx::TwoMeshes {
        let second_mesh = Mesh::load_obj(&args.obj_path);
        let second_index = Index::build(&second_mesh, args.config.accel);
        meshes.push((
            second_mesh,
            second_index,
            nalgebra::Isometry3::translation(4.0, 0.0, 4.0),
            WorldVector::new(0.6, 0.6, 0.8),
        ));
    }

    let scene = Scene::new(Room::cornell_box(), LightQuad::ceiling_array(), meshes);

    let camera = Camera::builder()
        .center(scene.get_camera_pos(args.config.camera_preset))
        .forward((scene.get_camera_target(args.config.camera_preset) - scene.get_camera_pos(args.config.camera_preset)).normalize())
        .up(WorldVector::new(0.0, 1.0, 0.0))
        .resolution(ScreenSize::new(args.width, args.height))
        .film_width(36e-3)
        .focal_length(50e-3)
        .f_number(8.0)
        .focus_distance(10.0)
        .build();

    let settings = RenderSettings { sample_count: args.samples };

    let bar = ProgressBar::no_length();
    bar.enable_steady_tick(Duration::from_millis(100));
    let mut render_progress = render(scene, camera, settings, args.config, |_| {}, {
        let bar = bar.clone();
        move |_, progress| {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.finished as u64);
        }
    })?;
    bar.set_length(render_progress.progress().total as u64);

    render_progress.wait();
    bar.finish_and_clear();

    let stats = render_progress.stats();
    println!("primary rays: intersection tests {}", stats.primary_tests);
    println!("primary rays: traversal steps   {}", stats.primary_steps);
    println!("shadow rays:  intersection tests {}", stats.shadow_tests);
    println!("shadow rays:  traversal steps   {}", stats.shadow_steps);
    println!("elapsed: {:.2?}", render_progress.elapsed());

    render_progress
        .image()
        .lock()
        .expect("Poisoned lock!")
        .save(&args.output_path)
        .with_context(|| format!("writing output image to {}", args.output_path))?;

    Ok(())
}

struct CliArgs {
    obj_path: String,
    output_path: String,
    width: u32,
    height: u32,
    samples: NonZeroU32,
    config: RenderConfig,
}

impl CliArgs {
    /// Minimal `--flag value` parser covering the runtime-configuration surface
    /// spec.md §6 names (`accelStructType`, `heatMap`, `SceneIdx`, camera preset),
    /// plus the asset path and output location. Unknown flags are an error.
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut obj_path = DEFAULT_OBJ_PATH.to_string();
        let mut output_path = "out.png".to_string();
        let mut width = DEFAULT_WIDTH;
        let mut height = DEFAULT_HEIGHT;
        let mut samples = DEFAULT_SAMPLES;
        let mut config = RenderConfig::default();

        let mut args = args.peekable();
        while let Some(flag) = args.next() {
            let mut value = || args.next().with_context(|| format!("{flag} requires a value"));
            match flag.as_str() {
                "--obj" => obj_path = value()?,
                "--out" => output_path = value()?,
                "--width" => width = value()?.parse().context("--width must be a positive integer")?,
                "--height" => height = value()?.parse().context("--height must be a positive integer")?,
                "--samples" => samples = value()?.parse().context("--samples must be a positive integer")?,
                "--accel" => {
                    config.accel = match value()?.as_str() {
                        "bvh" => AccelStructKind::Bvh,
                        "kdtree" => AccelStructKind::KdTree,
                        "octree" => AccelStructKind::Octree,
                        other => anyhow::bail!("unknown --accel value {other:?} (expected bvh/kdtree/octree)"),
                    }
                }
                "--heat-map" => {
                    config.heat_map = match value()?.as_str() {
                        "off" => None,
                        "tests" => Some(HeatMapMode::IntersectionTests),
                        "steps" => Some(HeatMapMode::TraversalSteps),
                        other => anyhow::bail!("unknown --heat-map value {other:?} (expected off/tests/steps)"),
                    }
                }
                "--scene" => {
                    config.scene_idx = match value()?.as_str() {
                        "single" => SceneIdx::SingleMesh,
                        "two" => SceneIdx::TwoMeshes,
                        other => anyhow::bail!("unknown --scene value {other:?} (expected single/two)"),
                    }
                }
                "--camera" => {
                    config.camera_preset = match value()?.as_str() {
                        "1" => CameraPreset::First,
                        "2" => CameraPreset::Second,
                        other => anyhow::bail!("unknown --camera value {other:?} (expected 1/2)"),
                    }
                }
                other => anyhow::bail!("unknown flag {other:?}"),
            }
        }

        Ok(CliArgs {
            obj_path,
            output_path,
            width,
            height,
            samples: NonZeroU32::new(samples).context("--samples must be nonzero")?,
            config,
        })
    }
}
