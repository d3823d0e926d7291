//! Quadrilateral built from two triangles.

use crate::hittable::{HitRecord, MaterialId};
use crate::triangle::Triangle;
use ember_math::{Aabb, Interval, Ray, Vec3};

/// A planar quad `abcd`, split along the diagonal `ac`.
#[derive(Debug, Clone)]
pub struct Rectangle {
    first: Triangle,
    second: Triangle,
    bbox: Aabb,
}

impl Rectangle {
    /// Vertices are given in order around the perimeter.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: MaterialId) -> Self {
        let first = Triangle::new(a, b, c, material);
        let second = Triangle::new(a, c, d, material);
        let bbox = Aabb::surrounding(&first.bounding_box(), &second.bounding_box());

        Self {
            first,
            second,
            bbox,
        }
    }

    pub fn triangles(&self) -> (&Triangle, &Triangle) {
        (&self.first, &self.second)
    }

    pub fn material(&self) -> MaterialId {
        self.first.material()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        self.first.normal_at(point)
    }

    /// Closest hit of the two halves. The second triangle is only searched
    /// in front of the first one's hit.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let first = self.first.hit(ray, ray_t);
        let window = first.map_or(ray_t, |h| ray_t.with_max(h.t));

        self.second.hit(ray, window).or(first)
    }
}
