//! Camera for ray generation.

use ember_core::random::gen_range_f64;
use ember_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How view-plane coordinates turn into rays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// All rays leave the eye.
    #[default]
    Perspective,
    /// Parallel rays along the view direction.
    Orthographic,
}

/// Pinhole camera over a flat view plane.
///
/// The view plane sits `focal_distance` in front of the eye and is
/// `viewport_width` wide. Pixels are square.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    eye: Vec3,
    focal_distance: f64,
    pixel_size: f64,
    projection: Projection,

    // Shutter interval for motion blur
    time0: f64,
    time1: f64,

    // Orthonormal basis: w points back toward the viewer
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    pub fn new(
        eye: Vec3,
        look_at: Vec3,
        up: Vec3,
        focal_distance: f64,
        image_width: u32,
        image_height: u32,
        viewport_width: f64,
    ) -> Self {
        let w = (eye - look_at).normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u);

        Self {
            image_width,
            image_height,
            eye,
            focal_distance,
            pixel_size: viewport_width / image_width.max(1) as f64,
            projection: Projection::Perspective,
            time0: 0.0,
            time1: 0.0,
            u,
            v,
            w,
        }
    }

    /// Set the shutter interval ray time stamps are drawn from.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Camera basis `(u, v, w)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// View-plane coordinate of pixel `(i, j)` plus a sub-pixel offset.
    ///
    /// Row `j` counts down from the top of the image. The plane is centered
    /// on the integer half of the image size.
    pub fn view_coordinate(&self, i: u32, j: u32, offset: (f64, f64)) -> (f64, f64) {
        let half_w = (self.image_width / 2) as f64;
        let half_h = (self.image_height / 2) as f64;
        let row = self.image_height.saturating_sub(j + 1) as f64;

        (
            self.pixel_size * (i as f64 - half_w + offset.0),
            self.pixel_size * (row - half_h + offset.1),
        )
    }

    /// Ray through the view-plane coordinate `(x, y)`.
    pub fn ray_for(&self, x: f64, y: f64, rng: &mut dyn RngCore) -> Ray {
        let time = self.sample_time(rng);
        let across = self.u * x + self.v * y;

        match self.projection {
            Projection::Perspective => {
                Ray::new(self.eye, across - self.w * self.focal_distance, time)
            }
            Projection::Orthographic => Ray::new(self.eye + across, -self.w, time),
        }
    }

    /// Generate a ray for pixel `(i, j)` at the given sub-pixel offset.
    pub fn get_ray(&self, i: u32, j: u32, offset: (f64, f64), rng: &mut dyn RngCore) -> Ray {
        let (x, y) = self.view_coordinate(i, j, offset);
        self.ray_for(x, y, rng)
    }

    fn sample_time(&self, rng: &mut dyn RngCore) -> f64 {
        if self.time1 > self.time0 {
            gen_range_f64(rng, self.time0, self.time1)
        } else {
            self.time0
        }
    }
}
