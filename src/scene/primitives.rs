use arrayvec::ArrayVec;
use itertools::Itertools as _;
use nalgebra::Unit;

use crate::geometry::{BoundingBox, EPSILON, FloatType, Ray, WorldPoint, WorldVector, sign};

use super::{Material, Object};

pub struct Sphere {
    center: WorldPoint,
    radius: FloatType,
    material: Material,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType, material: Material) -> Sphere {
        Sphere {
            center,
            radius,
            material,
        }
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint> {
        if ray.is_degenerate() {
            return None;
        }
        let guide = ray.direction().normalize();

        // Squared distance from the center to the ray's carrier line.
        let d2 = (ray.start - self.center).cross(&guide).norm_squared();
        if d2 > self.radius * self.radius {
            return None;
        }

        let point = if d2 < EPSILON {
            // Center on the line, the perpendicular construction degenerates.
            self.center - guide * self.radius
        } else {
            let t = (self.center - ray.start).cross(&guide);
            let to_line = t.cross(&guide).normalize() * d2.sqrt();
            self.center + to_line - guide * (self.radius * self.radius - d2).sqrt()
        };

        if (point - ray.start).dot(&guide) < 0.0 {
            return None;
        }
        Some(point)
    }

    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector> {
        Unit::new_normalize(point - self.center)
    }

    fn bounding_box(&self) -> BoundingBox {
        let r = WorldVector::repeat(self.radius);
        BoundingBox::new(self.center - r, self.center + r)
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

pub const MAX_POLYGON_VERTICES: usize = 8;

/// Planar convex polygon. The `orientation` hint point selects which side of
/// the plane the reported normal faces.
pub struct Polygon {
    vertices: ArrayVec<WorldPoint, MAX_POLYGON_VERTICES>,
    orientation: WorldPoint,
    material: Material,
}

impl Polygon {
    pub fn new(vertices: impl IntoIterator<Item = WorldPoint>, material: Material) -> Polygon {
        let vertices: ArrayVec<WorldPoint, MAX_POLYGON_VERTICES> = vertices.into_iter().collect();
        assert2::assert!(vertices.len() >= 3);
        Polygon {
            vertices,
            orientation: WorldPoint::origin(),
            material,
        }
    }

    pub fn triangle(vertices: [WorldPoint; 3], material: Material) -> Polygon {
        Polygon::new(vertices, material)
    }

    pub fn quadrangle(vertices: [WorldPoint; 4], material: Material) -> Polygon {
        Polygon::new(vertices, material)
    }

    pub fn with_orientation(mut self, orientation: WorldPoint) -> Polygon {
        self.orientation = orientation;
        self
    }

    fn base_normal(&self) -> WorldVector {
        (self.vertices[1] - self.vertices[0])
            .cross(&(self.vertices[2] - self.vertices[0]))
            .normalize()
    }

    fn oriented_normal(&self) -> WorldVector {
        let normal = self.base_normal();
        if sign(normal.dot(&(self.orientation - self.vertices[0]))) < 0 {
            -normal
        } else {
            normal
        }
    }

    /// Sign-consistency test against every edge; points on an edge count as inside.
    fn contains_point(&self, point: &WorldPoint) -> bool {
        let normal = self.base_normal();
        let mut positive = false;
        let mut negative = false;
        for (a, b) in self.vertices.iter().circular_tuple_windows() {
            match sign((a - point).cross(&(b - point)).dot(&normal)) {
                1 => positive = true,
                -1 => negative = true,
                _ => {}
            }
        }
        !(positive && negative)
    }
}

impl Object for Polygon {
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint> {
        if ray.is_degenerate() {
            return None;
        }
        let guide = ray.direction();
        let normal = self.base_normal();

        let d = normal.dot(&(self.vertices[0] - ray.start));
        let e = normal.dot(&guide);

        // sign(e) == 0: parallel to the plane. sign(d) == 0: start on the
        // plane. Differing signs put the crossing behind the start.
        if sign(e) == 0 || sign(d) != sign(e) {
            return None;
        }

        let point = ray.start + guide * (d / e);
        self.contains_point(&point).then_some(point)
    }

    fn normal_at(&self, _point: &WorldPoint) -> Unit<WorldVector> {
        Unit::new_normalize(self.oriented_normal())
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut low = self.vertices[0];
        let mut high = self.vertices[0];
        for v in &self.vertices[1..] {
            low = low.coords.zip_map(&v.coords, FloatType::min).into();
            high = high.coords.zip_map(&v.coords, FloatType::max).into();
        }
        BoundingBox::new(low, high)
    }

    fn material(&self) -> &Material {
        &self.material
    }
}
