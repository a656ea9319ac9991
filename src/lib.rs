mod camera;
pub mod geometry;
mod renderer;
pub mod scene;

pub use camera::Camera;
pub use renderer::{RenderError, RenderSettings, Rgba, render, render_to_file};
pub use scene::Scene;
