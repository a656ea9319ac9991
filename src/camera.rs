use assert2::assert;
use bon::bon;

use crate::geometry::{EPSILON, FloatType, ScreenSize, WorldPoint};

/// Fixed viewpoint and an image-plane window the rays are cast through.
///
/// The window is a parallelogram given by three of its corners; the fourth
/// is derived. Pixel `(0, 0)` maps to `left_top`.
#[derive(Clone, Debug)]
pub struct Camera {
    eye: WorldPoint,
    left_top: WorldPoint,
    right_top: WorldPoint,
    left_bottom: WorldPoint,
    right_bottom: WorldPoint,
    resolution: ScreenSize,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        eye: WorldPoint,
        left_top: WorldPoint,
        right_top: WorldPoint,
        left_bottom: WorldPoint,
        resolution: ScreenSize,
    ) -> Camera {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        let horizontal = right_top - left_top;
        let vertical = left_bottom - left_top;
        assert!(
            horizontal.cross(&vertical).norm_squared() > EPSILON,
            "window corners must span a plane"
        );

        Camera {
            eye,
            left_top,
            right_top,
            left_bottom,
            right_bottom: left_bottom + horizontal,
            resolution,
        }
    }
}

impl Camera {
    pub fn eye(&self) -> WorldPoint {
        self.eye
    }

    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// World-space point on the window for an image pixel, by bilinear
    /// interpolation between the corners.
    pub fn pixel_point(&self, x: u32, y: u32) -> WorldPoint {
        let u = x as FloatType / self.resolution.x as FloatType;
        let v = y as FloatType / self.resolution.y as FloatType;

        let top = self.left_top + (self.right_top - self.left_top) * u;
        let bottom = self.left_bottom + (self.right_bottom - self.left_bottom) * u;
        top + (bottom - top) * v
    }
}
