//! Hit records and the closed set of scene primitives.

use crate::{MovingSphere, Plane, Rectangle, Sphere, Triangle};
use ember_math::{Aabb, Interval, Ray, Vec3};

/// Index of a material in the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

impl MaterialId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a primitive in the scene's primitive arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(usize);

impl PrimitiveId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Surface coordinates
    pub u: f64,
    pub v: f64,
    /// Whether the ray arrived from the side the outward normal points to
    pub front_face: bool,
    pub material: MaterialId,
}

impl HitRecord {
    /// Build a record at parameter `t`, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f64, outward_normal: Vec3, uv: (f64, f64), material: MaterialId) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            point: ray.at(t),
            normal,
            t,
            u: uv.0,
            v: uv.1,
            front_face,
            material,
        }
    }
}

/// A geometric primitive stored in the scene arena.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    MovingSphere(MovingSphere),
    Plane(Plane),
    Triangle(Triangle),
    Rectangle(Rectangle),
}

impl Primitive {
    /// Closest intersection with `ray` inside `ray_t`, if any.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::MovingSphere(s) => s.hit(ray, ray_t),
            Primitive::Plane(p) => p.hit(ray, ray_t),
            Primitive::Triangle(t) => t.hit(ray, ray_t),
            Primitive::Rectangle(r) => r.hit(ray, ray_t),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::MovingSphere(s) => s.bounding_box(),
            Primitive::Plane(p) => p.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
            Primitive::Rectangle(r) => r.bounding_box(),
        }
    }

    /// Outward normal at a point on the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.normal_at(point),
            Primitive::MovingSphere(s) => s.normal_at(point),
            Primitive::Plane(p) => p.normal_at(point),
            Primitive::Triangle(t) => t.normal_at(point),
            Primitive::Rectangle(r) => r.normal_at(point),
        }
    }

    pub fn material(&self) -> MaterialId {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::MovingSphere(s) => s.material(),
            Primitive::Plane(p) => p.material(),
            Primitive::Triangle(t) => t.material(),
            Primitive::Rectangle(r) => r.material(),
        }
    }

    /// False for primitives with infinite extent, which cannot live in a BVH.
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Primitive::Plane(_))
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<MovingSphere> for Primitive {
    fn from(s: MovingSphere) -> Self {
        Primitive::MovingSphere(s)
    }
}

impl From<Plane> for Primitive {
    fn from(p: Plane) -> Self {
        Primitive::Plane(p)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl From<Rectangle> for Primitive {
    fn from(r: Rectangle) -> Self {
        Primitive::Rectangle(r)
    }
}

/// Closest hit over `primitives` by linear scan.
pub(crate) fn hit_closest<'p, I>(primitives: I, ray: &Ray, ray_t: Interval) -> Option<HitRecord>
where
    I: IntoIterator<Item = &'p Primitive>,
{
    let mut closest: Option<HitRecord> = None;

    for primitive in primitives {
        let window = closest.map_or(ray_t, |h| ray_t.with_max(h.t));
        if let Some(rec) = primitive.hit(ray, window) {
            closest = Some(rec);
        }
    }

    closest
}
