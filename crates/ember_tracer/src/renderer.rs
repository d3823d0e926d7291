//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed depth cap
//! - Multi-jittered anti-aliasing
//! - Bucketed parallel rendering with one random stream per pixel

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use ember_math::{Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::scene::Scene;

/// Closest accepted hit distance. Keeps bounced rays from re-hitting the
/// surface they leave.
pub const T_MIN: f64 = 0.001;

/// Compute the color seen by a ray.
///
/// Light only enters through paths that reach an emitter or escape to the
/// background; `depth` bounds the number of bounces.
pub fn radiance(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene.hit(ray, Interval::from_min(T_MIN)) else {
        return scene.background();
    };

    // Dangling material ids absorb
    let Some(material) = scene.material(rec.material) else {
        return Color::ZERO;
    };

    let emitted = material.emitted();
    match material.scatter(ray, &rec, rng) {
        Some(result) => {
            emitted + result.attenuation * radiance(&result.scattered, scene, depth - 1, rng)
        }
        None => emitted,
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f64| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Independent random stream for one pixel.
///
/// The stream depends only on the base seed and the pixel index, so a render
/// is reproducible no matter how pixels are scheduled across threads.
pub fn pixel_rng(seed: u64, pixel_index: u64) -> StdRng {
    StdRng::seed_from_u64(splitmix64(seed ^ splitmix64(pixel_index)))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Render a single pixel by averaging every sample of the configured pattern.
///
/// All sample colors are gathered first and averaged afterwards. A pattern
/// that yields no samples gives black.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let offsets = config.sampling.offsets(rng);
    let mut samples = Vec::with_capacity(config.sampling.samples_per_pixel());

    for offset in offsets {
        let ray = camera.get_ray(x, y, offset, rng);
        samples.push(radiance(&ray, scene, config.max_depth, rng));
    }

    if samples.is_empty() {
        return Color::ZERO;
    }
    samples.iter().sum::<Color>() / samples.len() as f64
}

/// Linear-space framebuffer, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y). Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, &color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, color);
        }
    }

    /// Convert to gamma-corrected RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Render the entire scene to an image buffer.
///
/// Buckets are rendered in parallel with rayon, center first.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    let total = buckets.len();
    let done = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} with {} samples per pixel in {} buckets",
        camera.image_width,
        camera.image_height,
        config.sampling.samples_per_pixel(),
        total
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let pixels = render_bucket(bucket, camera, scene, config);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {} done ({}/{})", bucket.index, finished, total);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::sampler::SamplePattern;
    use crate::scene::SceneBuilder;
    use crate::sphere::Sphere;
    use ember_core::Texture;
    use ember_math::Vec3;

    fn lit_scene() -> Scene {
        let mut builder = SceneBuilder::new().with_background(Color::splat(0.5));
        let gray = builder.add_material(Material::lambertian(Texture::solid(Color::splat(0.5))));
        builder.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray));
        builder.build()
    }

    #[test]
    fn test_depth_zero_is_black() {
        let scene = lit_scene();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(radiance(&ray, &scene, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = lit_scene();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);

        assert_eq!(radiance(&ray, &scene, 10, &mut rng), Color::splat(0.5));
    }

    #[test]
    fn test_diffuse_bounce_is_attenuated() {
        let scene = lit_scene();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);

        // One diffuse bounce off a 0.5 albedo under a 0.5 sky
        let c = radiance(&ray, &scene, 2, &mut rng);
        assert!(c == Color::splat(0.25) || c == Color::ZERO, "{c:?}");
    }

    #[test]
    fn test_gamma_and_rgba() {
        assert_eq!(linear_to_gamma(0.25), 0.5);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(color_to_rgba(Color::new(1.0, 0.0, 4.0)), [255, 0, 255, 255]);
        assert_eq!(color_to_rgba(Color::splat(f64::NAN)), [0, 0, 0, 255]);
    }

    #[test]
    fn test_pixel_rng_streams_differ() {
        let mut a = pixel_rng(7, 0);
        let mut b = pixel_rng(7, 1);
        let mut a2 = pixel_rng(7, 0);

        let first = a.next_u64();
        assert_eq!(first, a2.next_u64());
        assert_ne!(first, b.next_u64());
    }

    #[test]
    fn test_render_pixel_averages_samples() {
        let scene = SceneBuilder::new().with_background(Color::new(0.1, 0.2, 0.3)).build();
        let camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 1.0, 4, 4, 1.0);
        let config = RenderConfig {
            sampling: SamplePattern::MultiJitter { fine_grid: 9 },
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let color = render_pixel(&camera, &scene, 1, 1, &config, &mut rng);
        assert!((color - Color::new(0.1, 0.2, 0.3)).length() < 1e-12);
    }

    #[test]
    fn test_image_buffer_bounds() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::ONE);
        image.set(3, 0, Color::ONE);

        assert_eq!(image.get(2, 1), Some(Color::ONE));
        assert_eq!(image.get(0, 2), None);
        assert_eq!(image.pixels.iter().filter(|&&c| c == Color::ONE).count(), 1);
        assert_eq!(image.to_rgba().len(), 3 * 2 * 4);
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = lit_scene();
        let config = RenderConfig {
            width: 12,
            height: 8,
            bucket_size: 5,
            max_depth: 4,
            sampling: SamplePattern::MultiJitter { fine_grid: 4 },
            ..RenderConfig::default()
        };
        let camera = config.build_camera();

        let a = render(&scene, &camera, &config);
        let b = render(&scene, &camera, &config);
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.pixels.len(), 12 * 8);
    }
}
