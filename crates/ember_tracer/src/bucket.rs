//! Square image tiles, the unit of parallel work.
//!
//! A render splits the frame into buckets, traces them on the rayon pool
//! and stitches the results back into one framebuffer.

use ember_math::Color;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::renderer::{pixel_rng, render_pixel};
use crate::scene::Scene;

/// Default bucket edge in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Tile of the image, clipped to the frame at the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Top-left pixel
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Rank in render order, 0 first
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Image coordinates covered by the tile, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height).flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Cover a `width` x `height` frame with buckets, nearest the frame center
/// first.
///
/// Equally distant buckets keep scanline order. A `bucket_size` of 0 is
/// treated as 1.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let dist_sq = |b: &Bucket| {
        let (bx, by) = b.center();
        (bx - cx).powi(2) + (by - cy).powi(2)
    };
    buckets.sort_by(|a, b| dist_sq(a).total_cmp(&dist_sq(b)));

    for (rank, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = rank;
    }
    buckets
}

/// Trace every pixel of `bucket`, row by row.
///
/// Each pixel seeds its own generator from its index in the full frame, so
/// the result does not depend on which thread renders the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
) -> Vec<Color> {
    bucket
        .pixels()
        .map(|(x, y)| {
            let mut rng = pixel_rng(config.seed, y as u64 * camera.image_width as u64 + x as u64);
            render_pixel(camera, scene, x, y, config, &mut rng)
        })
        .collect()
}

/// Finished bucket waiting to be copied into the framebuffer.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Same order as [`Bucket::pixels`]
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}
