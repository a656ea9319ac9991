use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::camera::Camera;
use crate::geometry::{ColorVector, approx_eq};
use crate::scene::Scene;

pub type Rgba = rgb::RGBA<f32>;

/// How far the shadow ray's hit may land from the shaded point and still
/// count as the same surface point. Looser than the geometric epsilon to
/// absorb the round trip through the tree.
const SHADOW_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Scene-wide ambient term multiplied into every material's ambient color.
    pub global_ambient: ColorVector,
    /// Color of pixels whose primary ray escapes the scene.
    pub background: Rgba,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            global_ambient: ColorVector::repeat(0.7),
            background: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write the image: {0}")]
    Image(#[from] image::ImageError),
}

/// Renders the whole image, one primary ray per pixel.
///
/// `row_finished` is called after each completed row with its y coordinate,
/// for progress reporting.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    mut row_finished: impl FnMut(u32),
) -> RgbaImage {
    let resolution = camera.resolution();
    let mut image = RgbaImage::new(resolution.x, resolution.y);

    for y in 0..resolution.y {
        for x in 0..resolution.x {
            let color = render_pixel(scene, camera, settings, x, y);
            image.put_pixel(x, y, color_to_image(color));
        }
        row_finished(y);
    }

    image
}

fn render_pixel(scene: &Scene, camera: &Camera, settings: &RenderSettings, x: u32, y: u32) -> Rgba {
    let eye = camera.eye();
    let Some((object, point)) = scene.trace_ray(eye, camera.pixel_point(x, y)) else {
        return settings.background;
    };

    let material = object.material();
    let normal = object.normal_at(&point);

    let mut energy = material.emit + material.ambient.component_mul(&settings.global_ambient);
    for light in scene.lights() {
        // Shadow test: trace from the light toward the point and require the
        // first thing hit to be the point itself.
        let lit = scene
            .trace_ray(light.position, point)
            .is_some_and(|(_, blocker)| approx_eq(&blocker, &point, SHADOW_TOLERANCE));
        if lit {
            energy += light.intensity_at(&point, &normal, &eye, material);
        }
    }

    Rgba::new(
        energy.x.clamp(0.0, 1.0) as f32,
        energy.y.clamp(0.0, 1.0) as f32,
        energy.z.clamp(0.0, 1.0) as f32,
        1.0,
    )
}

/// Maps a 0-1 f32 rgba pixel to the pixel type of module image.
fn color_to_image(color: Rgba) -> image::Rgba<u8> {
    image::Rgba([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

pub fn render_to_file(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    path: &Path,
    row_finished: impl FnMut(u32),
) -> Result<(), RenderError> {
    let image = render(scene, camera, settings, row_finished);
    image.save(path)?;
    Ok(())
}
