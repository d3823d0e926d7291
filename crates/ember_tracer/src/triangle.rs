//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::hittable::{HitRecord, MaterialId};
use ember_math::{Aabb, Interval, Ray, Vec3};

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f64 = 1e-6;

/// A triangle primitive with optional per-vertex normals.
#[derive(Debug, Clone)]
pub struct Triangle {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    /// Unit face normal, `(b - a) x (c - a)`
    normal: Vec3,
    /// Smooth shading normals at a, b and c
    vertex_normals: Option<[Vec3; 3]>,
    material: MaterialId,
    bbox: Aabb,
}

impl Triangle {
    /// Create a flat-shaded triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: MaterialId) -> Self {
        let normal = (b - a).cross(c - a).normalize();
        let bbox = Aabb::enclosing([a, b, c]);

        Self {
            a,
            b,
            c,
            normal,
            vertex_normals: None,
            material,
            bbox,
        }
    }

    /// Enable smooth shading with the given vertex normals.
    pub fn with_vertex_normals(mut self, na: Vec3, nb: Vec3, nc: Vec3) -> Self {
        self.vertex_normals = Some([na, nb, nc]);
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// The flat face normal. The point is not needed for a planar face.
    pub fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    /// Area-ratio barycentric coordinates of `point`.
    ///
    /// Each weight is the area of the sub-triangle opposite its vertex
    /// divided by the full area, so points outside the triangle produce
    /// weights summing to more than one.
    pub fn barycentric(&self, point: Vec3) -> Vec3 {
        let total = area(self.a, self.b, self.c);
        Vec3::new(
            area(point, self.b, self.c),
            area(self.a, point, self.c),
            area(self.a, self.b, point),
        ) / total
    }

    /// Vertex normals blended by the barycentric weights of `point`.
    /// Falls back to the face normal when no vertex normals are set.
    pub fn interpolated_normal(&self, point: Vec3) -> Vec3 {
        match self.vertex_normals {
            Some([na, nb, nc]) => {
                let w = self.barycentric(point);
                (na * w.x + nb * w.y + nc * w.z)
                    .try_normalize()
                    .unwrap_or(self.normal)
            }
            None => self.normal,
        }
    }

    /// Möller-Trumbore ray-triangle intersection.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;

        let q = ray.direction.cross(e2);
        let p = e1.dot(q);

        if p.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / p;
        let s = ray.origin - self.a;
        let u = f * s.dot(q);
        if u < 0.0 {
            return None;
        }

        let r = s.cross(e1);
        let v = f * ray.direction.dot(r);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * e2.dot(r);
        if !ray_t.contains(t) {
            return None;
        }

        let outward_normal = match self.vertex_normals {
            Some(_) => self.interpolated_normal(ray.at(t)),
            None => self.normal,
        };

        Some(HitRecord::new(ray, t, outward_normal, (u, v), self.material))
    }
}

/// Area of the triangle `xyz`.
#[inline]
fn area(x: Vec3, y: Vec3, z: Vec3) -> f64 {
    0.5 * (y - x).cross(z - x).length()
}
