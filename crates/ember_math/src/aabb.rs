use crate::{Interval, Ray, Vec3};

/// Padding applied on both sides of any axis whose thickness is exactly zero.
pub const AABB_PAD: f64 = 1e-7;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Invariant: `min[i] <= max[i]` on every axis for any box built through
/// [`Aabb::new`] or [`Aabb::from_points`], and no axis has zero thickness.
/// [`Aabb::EMPTY`] is the identity of [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its minimum and maximum corners, padding flat axes.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let mut aabb = Self { min, max };
        aabb.pad_degenerate();
        aabb
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Smallest box enclosing every point in `points`, or `EMPTY` for none.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut min = Vec3::splat(f64::INFINITY);
        let mut max = Vec3::splat(f64::NEG_INFINITY);
        let mut any = false;
        for p in points {
            min = min.min(p);
            max = max.max(p);
            any = true;
        }
        if any {
            Self::new(min, max)
        } else {
            Self::EMPTY
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Get the extent along a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Slab test against the window `ray_t`.
    ///
    /// Division by a zero direction component is left to IEEE 754: the
    /// resulting infinities fold through `min`/`max` into the correct
    /// accept/reject answer. The one case that yields NaN is a ray lying in
    /// a slab face (`0 / 0`); its origin is then inside that closed slab, so
    /// the axis does not narrow the window.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        let mut t_min = ray_t.min;
        let mut t_max = ray_t.max;

        for axis in 0..3 {
            let slab = self.axis(axis);
            let t0 = (slab.min - r.origin[axis]) / r.direction[axis];
            let t1 = (slab.max - r.origin[axis]) / r.direction[axis];
            if t0.is_nan() || t1.is_nan() {
                continue;
            }

            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
            if t_max <= t_min {
                return false;
            }
        }

        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Extents are compared in x, y, z order and a later axis only wins when
    /// strictly longer, so ties resolve toward x.
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        let mut axis = 0;
        let mut longest = extent.x;
        if extent.y > longest {
            axis = 1;
            longest = extent.y;
        }
        if extent.z > longest {
            axis = 2;
        }
        axis
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True if `other` lies inside this box (boundaries included).
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    fn pad_degenerate(&mut self) {
        for axis in 0..3 {
            if self.min[axis] == self.max[axis] {
                self.min[axis] -= AABB_PAD;
                self.max[axis] += AABB_PAD;
            }
        }
    }

    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f64::INFINITY),
        max: Vec3::splat(f64::NEG_INFINITY),
    };

    pub const UNIVERSE: Aabb = Aabb {
        min: Vec3::splat(f64::NEG_INFINITY),
        max: Vec3::splat(f64::INFINITY),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_pads_flat_axis() {
        let aabb = Aabb::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 1.0));

        assert_eq!(aabb.min.y, 2.0 - AABB_PAD);
        assert_eq!(aabb.max.y, 2.0 + AABB_PAD);
        // Other axes untouched
        assert_eq!(aabb.min.x, 0.0);
        assert_eq!(aabb.max.z, 1.0);
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min, Vec3::ZERO);
        assert_eq!(surrounding.max, Vec3::splat(10.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_hit_through_center() {
        let aabb = unit_box();

        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Not normalized, oblique, still through the center
        let ray = Ray::new_simple(Vec3::new(-3.0, 4.0, 7.0), Vec3::new(3.0, -4.0, -7.0) * 0.25);
        assert!(aabb.hit(&ray, Interval::from_min(0.0)));
    }

    #[test]
    fn test_aabb_miss_outside_on_every_axis() {
        let aabb = unit_box();

        // Pointing away on every axis
        let ray = Ray::new_simple(Vec3::splat(5.0), Vec3::new(1.0, 2.0, 3.0));
        assert!(!aabb.hit(&ray, Interval::from_min(0.0)));

        // Pointing away along z
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_zero_direction_component() {
        let aabb = unit_box();

        // Inside the x and y slabs, travelling only along z
        let ray = Ray::new_simple(Vec3::new(0.5, -0.5, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::from_min(0.0)));

        // Outside the x slab with zero x velocity never enters it
        let ray = Ray::new_simple(Vec3::new(3.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::from_min(0.0)));
    }

    #[test]
    fn test_aabb_ray_in_slab_face() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::splat(1.0));

        // Travels inside the x = 0 face, so x contributes 0 / 0
        let ray = Ray::new_simple(Vec3::new(0.0, 0.5, 5.0), Vec3::NEG_Z);
        assert!(aabb.hit(&ray, Interval::from_min(0.001)));

        // On the max face of y as well
        let ray = Ray::new_simple(Vec3::new(1.0, 1.0, -3.0), Vec3::Z);
        assert!(aabb.hit(&ray, Interval::from_min(0.001)));

        // Lying in the face plane does not help when the box is behind the window
        let ray = Ray::new_simple(Vec3::new(0.0, 0.5, 5.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::from_min(0.001)));
    }

    #[test]
    fn test_aabb_axis() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(aabb.axis(1), Interval::new(2.0, 4.0));
    }

    #[test]
    fn test_aabb_window_excludes_box() {
        let aabb = unit_box();
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        // Box spans t in [4, 6]
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.9)));
        assert!(!aabb.hit(&ray, Interval::new(6.1, 100.0)));
    }

    #[test]
    fn test_aabb_flat_box_is_hit_after_padding() {
        let flat = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, -1.0));
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        assert!(flat.hit(&ray, Interval::from_min(0.001)));
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 4.0, -2.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 2.0, -1.0));
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(), 1);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(), 2);
    }

    #[test]
    fn test_aabb_longest_axis_ties_prefer_x_then_y() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::splat(1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 2.0)).longest_axis(), 1);
    }

    #[test]
    fn test_aabb_contains_box() {
        let outer = Aabb::from_points(Vec3::splat(-2.0), Vec3::splat(2.0));
        let inner = unit_box();

        assert!(outer.contains_box(&inner));
        assert!(outer.contains_box(&outer));
        assert!(!inner.contains_box(&outer));
    }

    #[test]
    fn test_aabb_enclosing() {
        let b = Aabb::enclosing([Vec3::new(1.0, -1.0, 0.0), Vec3::new(-1.0, 3.0, 2.0)]);
        assert_eq!(b.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 2.0));
        assert!(Aabb::enclosing(std::iter::empty()).is_empty());
    }
}
