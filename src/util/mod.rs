pub mod stats;

pub use stats::Stats;

/// Linear (pre-tonemap) color, matching the teacher's own choice of `rgb::RGBA<f32>`.
pub type Rgba = rgb::RGBA<f32>;
