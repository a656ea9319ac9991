pub mod kd_tree;
pub mod primitives;

use index_vec::IndexVec;
use nalgebra::Unit;

use crate::geometry::{BoundingBox, ColorVector, FloatType, Ray, WorldPoint, WorldVector};
use kd_tree::{BuildConfig, KdTree};

index_vec::define_index_type! {
    pub struct ObjectIdx = u32;
}

pub type ObjectStore = IndexVec<ObjectIdx, Box<dyn Object>>;

/// Renderable object.
pub trait Object {
    /// Nearest forward intersection of the ray with this object's surface.
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint>;

    /// Outward unit normal at a surface point.
    fn normal_at(&self, point: &WorldPoint) -> Unit<WorldVector>;

    fn bounding_box(&self) -> BoundingBox;

    fn material(&self) -> &Material;
}

#[derive(Clone, Debug)]
pub struct Material {
    pub ambient: ColorVector,
    pub diffuse: ColorVector,
    pub specular: ColorVector,
    pub shine: FloatType,
    pub emit: ColorVector,
}

impl Material {
    pub fn new(ambient: ColorVector, diffuse: ColorVector, specular: ColorVector, shine: FloatType) -> Material {
        Material {
            ambient,
            diffuse,
            specular,
            shine,
            emit: ColorVector::zeros(),
        }
    }

    /// Matte material with the given color for both ambient and diffuse terms.
    pub fn matte(color: ColorVector) -> Material {
        Material::new(color, color, ColorVector::zeros(), 1.0)
    }
}

/// Per-channel light intensities and the distance attenuation polynomial
/// `1 / (k0 + k1*d + k2*d^2)`.
#[derive(Clone, Debug)]
pub struct LightParams {
    pub ambient: ColorVector,
    pub diffuse: ColorVector,
    pub specular: ColorVector,
    pub attenuation: ColorVector,
}

impl LightParams {
    /// White light of uniform strength, attenuated by squared distance.
    pub fn uniform(intensity: FloatType) -> LightParams {
        LightParams {
            ambient: ColorVector::repeat(intensity),
            diffuse: ColorVector::repeat(intensity),
            specular: ColorVector::repeat(intensity),
            attenuation: ColorVector::new(0.0, 0.0, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointLight {
    pub position: WorldPoint,
    pub params: LightParams,
}

impl PointLight {
    pub fn new(position: WorldPoint, params: LightParams) -> PointLight {
        PointLight { position, params }
    }

    /// Phong contribution of this light at a surface point seen from `viewer`.
    /// The caller is responsible for the shadow test.
    pub fn intensity_at(
        &self,
        point: &WorldPoint,
        normal: &Unit<WorldVector>,
        viewer: &WorldPoint,
        material: &Material,
    ) -> ColorVector {
        let to_light = self.position - point;
        let d2 = to_light.norm_squared();

        let n = normal.as_ref();
        let v = (viewer - point).normalize();
        let l = to_light.normalize();
        let r = n * (2.0 * n.dot(&l)) - l;

        let diffuse = material.diffuse * n.dot(&l).max(0.0);
        let specular = material.specular * r.dot(&v).max(0.0).powf(material.shine);

        let energy = material.ambient.component_mul(&self.params.ambient)
            + diffuse.component_mul(&self.params.diffuse)
            + specular.component_mul(&self.params.specular);

        let k = &self.params.attenuation;
        energy / (k[0] + k[1] * d2.sqrt() + k[2] * d2)
    }
}

/// A static set of objects and lights with a kd-tree built over the objects.
/// The tree is built once in `new` and is read-only afterwards.
pub struct Scene {
    objects: ObjectStore,
    lights: Vec<PointLight>,
    tree: KdTree,
}

impl Scene {
    pub fn new(objects: Vec<Box<dyn Object>>, lights: Vec<PointLight>, config: &BuildConfig) -> Scene {
        let objects: ObjectStore = objects.into_iter().collect();
        let tree = KdTree::build(&objects, config);
        Scene {
            objects,
            lights,
            tree,
        }
    }

    /// Nearest intersection along `start -> finish`, for both primary and
    /// shadow rays.
    pub fn trace_ray(&self, start: WorldPoint, finish: WorldPoint) -> Option<(&dyn Object, WorldPoint)> {
        let hit = self.tree.trace(&self.objects, &Ray::new(start, finish))?;
        Some((self.objects[hit.object].as_ref(), hit.point))
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }
}
