//! Ember math - double precision vectors, rays, intervals and bounding boxes.
//!
//! Everything geometric in Ember is `f64`. glam's `DVec3` is re-exported as
//! [`Vec3`] so the rest of the workspace never spells the precision out.

// Re-export glam for convenience
pub use glam::*;

/// Three-component double precision vector used for points, directions and colors.
pub type Vec3 = glam::DVec3;

/// Linear RGB color. Components are unbounded radiance values.
pub type Color = glam::DVec3;

mod aabb;
mod interval;
mod ray;

pub use aabb::{Aabb, AABB_PAD};
pub use interval::Interval;
pub use ray::Ray;

/// Returns true if every component of `v` is closer to zero than `1e-8`.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f64 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

/// Mirror `v` about the plane with normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with unit normal `n`.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
