//! Infinite plane primitive.

use crate::hittable::{HitRecord, MaterialId};
use ember_math::{Aabb, Interval, Ray, Vec3};

/// An unbounded plane through `point` with unit normal `normal`.
///
/// Planes have no finite bounding box, so the scene keeps them out of the
/// BVH and tests them separately.
#[derive(Debug, Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: MaterialId,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3, material: MaterialId) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
        }
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    pub fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    /// A ray parallel to the plane divides by zero; the resulting infinity
    /// or NaN fails the window test.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let t = (self.point - ray.origin).dot(self.normal) / ray.direction.dot(self.normal);

        if t < 0.0 || !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, (0.0, 0.0), self.material))
    }
}
