mod aabb;

pub use aabb::BoundingBox;

pub type FloatType = f64;

pub const EPSILON: FloatType = 1e-8;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

/// Linear RGB energy. Not clamped until it is converted for output.
pub type ColorVector = nalgebra::Vector3<FloatType>;

pub type ScreenSize = nalgebra::Vector2<u32>;

/// A ray given by two points. `start` is the origin, `finish` fixes the
/// direction; the ray itself extends beyond `finish`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub start: WorldPoint,
    pub finish: WorldPoint,
}

impl Ray {
    pub fn new(start: WorldPoint, finish: WorldPoint) -> Ray {
        Ray { start, finish }
    }

    pub fn direction(&self) -> WorldVector {
        self.finish - self.start
    }

    /// A degenerate ray has no direction and intersects nothing.
    pub fn is_degenerate(&self) -> bool {
        self.direction().norm_squared() < EPSILON * EPSILON
    }
}

pub fn approx_eq(a: &WorldPoint, b: &WorldPoint, tolerance: FloatType) -> bool {
    (a - b).amax() < tolerance
}

/// Sign of `a` with values within `EPSILON` of zero treated as zero.
pub fn sign(a: FloatType) -> i32 {
    if a.abs() < EPSILON {
        0
    } else if a > 0.0 {
        1
    } else {
        -1
    }
}
