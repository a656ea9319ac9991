use assert2::debug_assert;

use super::{EPSILON, FloatType, Ray, WorldPoint};

/// Axis aligned box, `low[axis] <= high[axis]` on every axis.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub low: WorldPoint,
    pub high: WorldPoint,
}

impl BoundingBox {
    pub fn new(low: WorldPoint, high: WorldPoint) -> BoundingBox {
        debug_assert!(low.x <= high.x);
        debug_assert!(low.y <= high.y);
        debug_assert!(low.z <= high.z);
        BoundingBox { low, high }
    }

    /// Tightest box containing every box of the iterator, `None` when it is empty.
    pub fn enclosing(boxes: impl IntoIterator<Item = BoundingBox>) -> Option<BoundingBox> {
        let mut boxes = boxes.into_iter();
        let mut result = boxes.next()?;
        for b in boxes {
            result.expand(&b);
        }
        Some(result)
    }

    /// Grows this box to the per-axis min/max with `other`.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.low = self.low.coords.zip_map(&other.low.coords, FloatType::min).into();
        self.high = self.high.coords.zip_map(&other.high.coords, FloatType::max).into();
    }

    pub fn low(&self, axis: usize) -> FloatType {
        self.low[axis]
    }

    pub fn high(&self, axis: usize) -> FloatType {
        self.high[axis]
    }

    pub fn length(&self, axis: usize) -> FloatType {
        self.high[axis] - self.low[axis]
    }

    pub fn contains(&self, p: &WorldPoint) -> bool {
        (0..3).all(|axis| {
            p[axis] >= self.low[axis] - EPSILON && p[axis] <= self.high[axis] + EPSILON
        })
    }

    /// Cuts the box at `low[axis] + proportion * length(axis)`.
    /// `proportion` is expected in (0, 1) but is not validated.
    pub fn split(&self, axis: usize, proportion: FloatType) -> (BoundingBox, BoundingBox) {
        let coordinate = self.low[axis] + self.length(axis) * proportion;

        let mut left_high = self.high;
        let mut right_low = self.low;
        left_high[axis] = coordinate;
        right_low[axis] = coordinate;

        (
            BoundingBox::new(self.low, left_high),
            BoundingBox::new(right_low, self.high),
        )
    }

    /// Slab test. Returns the entry and exit points of the ray, with the entry
    /// clamped to `ray.start` when the start is inside the box.
    /// Degenerate rays and rays whose whole intersection lies behind the start miss.
    pub fn intersect(&self, ray: &Ray) -> Option<(WorldPoint, WorldPoint)> {
        if ray.is_degenerate() {
            return None;
        }
        let direction = ray.direction().normalize();

        let mut tmin = FloatType::NEG_INFINITY;
        let mut tmax = FloatType::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / direction[axis];
            // 0 * inf turns into NaN when the start sits exactly on a slab plane
            // of an axis the ray does not move along; the slab is infinite then.
            let to_low = non_nan((self.low[axis] - ray.start[axis]) * inv, FloatType::NEG_INFINITY);
            let to_high = non_nan((self.high[axis] - ray.start[axis]) * inv, FloatType::INFINITY);

            tmin = tmin.max(to_low.min(to_high));
            tmax = tmax.min(to_low.max(to_high));
        }

        if tmin > tmax || tmax <= 0.0 {
            return None;
        }

        let entry = if tmin > 0.0 {
            ray.start + direction * tmin
        } else {
            ray.start
        };
        let exit = ray.start + direction * tmax;

        Some((entry, exit))
    }
}

fn non_nan(x: FloatType, fallback: FloatType) -> FloatType {
    if x.is_nan() { fallback } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{WorldVector, approx_eq};
    use assert2::{assert, let_assert};
    use test_case::test_case;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn entry_and_exit_through_unit_box() {
        let ray = Ray::new(
            WorldPoint::new(0.5, 0.5, -5.0),
            WorldPoint::new(0.5, 0.5, 5.0),
        );

        let_assert!(Some((entry, exit)) = unit_box().intersect(&ray));
        assert!(approx_eq(&entry, &WorldPoint::new(0.5, 0.5, 0.0), 1e-9));
        assert!(approx_eq(&exit, &WorldPoint::new(0.5, 0.5, 1.0), 1e-9));
    }

    #[test]
    fn start_inside_clamps_entry_to_start() {
        let ray = Ray::new(
            WorldPoint::new(0.5, 0.5, 0.5),
            WorldPoint::new(0.5, 0.5, 5.0),
        );

        let_assert!(Some((entry, exit)) = unit_box().intersect(&ray));
        assert!(entry == ray.start);
        assert!(approx_eq(&exit, &WorldPoint::new(0.5, 0.5, 1.0), 1e-9));
    }

    // Rays parallel to one axis, starting outside the corresponding slab.
    #[test_case(-1.0,  0.5,  0.5,   0.0, 1.0, 0.0 ; "low_x_parallel")]
    #[test_case( 2.0,  0.5,  0.5,   0.0, 1.0, 0.0 ; "high_x_parallel")]
    #[test_case( 0.5, -1.0,  0.5,   1.0, 0.0, 0.0 ; "low_y_parallel")]
    #[test_case( 0.5,  2.0,  0.5,   1.0, 0.0, 0.0 ; "high_y_parallel")]
    #[test_case( 0.5,  0.5, -1.0,   1.0, 0.0, 0.0 ; "low_z_parallel")]
    #[test_case( 0.5,  0.5,  2.0,   1.0, 0.0, 0.0 ; "high_z_parallel")]
    fn parallel_misses(px: FloatType, py: FloatType, pz: FloatType, dx: FloatType, dy: FloatType, dz: FloatType) {
        let start = WorldPoint::new(px, py, pz);
        let ray = Ray::new(start, start + WorldVector::new(dx, dy, dz));
        assert!(unit_box().intersect(&ray) == None);
    }

    #[test]
    fn box_behind_the_start_misses() {
        let ray = Ray::new(
            WorldPoint::new(0.5, 0.5, 5.0),
            WorldPoint::new(0.5, 0.5, 10.0),
        );
        assert!(unit_box().intersect(&ray) == None);
    }

    #[test]
    fn degenerate_ray_misses() {
        let p = WorldPoint::new(0.5, 0.5, 0.5);
        assert!(unit_box().intersect(&Ray::new(p, p)) == None);
    }

    #[test]
    fn expand_is_componentwise_union() {
        let mut b = unit_box();
        b.expand(&BoundingBox::new(
            WorldPoint::new(-1.0, 0.25, 0.5),
            WorldPoint::new(0.5, 2.0, 0.75),
        ));
        assert!(b.low == WorldPoint::new(-1.0, 0.0, 0.0));
        assert!(b.high == WorldPoint::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn split_shares_the_boundary_plane() {
        let (left, right) = unit_box().split(2, 0.25);
        assert!(left.low == WorldPoint::new(0.0, 0.0, 0.0));
        assert!(left.high == WorldPoint::new(1.0, 1.0, 0.25));
        assert!(right.low == WorldPoint::new(0.0, 0.0, 0.25));
        assert!(right.high == WorldPoint::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn contains_has_epsilon_tolerance() {
        let b = unit_box();
        assert!(b.contains(&WorldPoint::new(1.0 + EPSILON / 2.0, 0.5, 0.5)));
        assert!(!b.contains(&WorldPoint::new(1.1, 0.5, 0.5)));
    }
}
