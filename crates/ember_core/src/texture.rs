//! Textures: the `value(u, v, p) -> Color` contract consumed by materials.
//!
//! Materials treat a texture as a black box. Textures are immutable after
//! construction and shared between materials through `Arc`.

use std::path::Path;
use std::sync::Arc;

use ember_math::{Color, Vec3};
use rand::RngCore;
use thiserror::Error;

use crate::perlin::Perlin;

/// Octaves summed by the marble texture's turbulence.
const TURBULENCE_DEPTH: usize = 7;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A surface color lookup.
#[derive(Clone, Debug)]
pub enum Texture {
    /// Constant color everywhere.
    Solid(Color),
    /// Solid 3D checker pattern alternating between two textures.
    Checker { even: Arc<Texture>, odd: Arc<Texture> },
    /// Perlin marble.
    Noise { perlin: Perlin, scale: f64 },
    /// Bitmap looked up by `(u, v)`.
    Image(ImageTexture),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(even: Color, odd: Color) -> Self {
        Texture::Checker {
            even: Arc::new(Texture::Solid(even)),
            odd: Arc::new(Texture::Solid(odd)),
        }
    }

    pub fn noise(scale: f64, rng: &mut dyn RngCore) -> Self {
        Texture::Noise {
            perlin: Perlin::new(rng),
            scale,
        }
    }

    /// Color at surface coordinates `(u, v)` and world-space point `p`.
    pub fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { even, odd } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    odd.value(u, v, p)
                } else {
                    even.value(u, v, p)
                }
            }
            Texture::Noise { perlin, scale } => {
                let marble = 1.0 + (scale * p.z + 50.0 * perlin.turbulence(p, TURBULENCE_DEPTH)).sin();
                Color::ONE * 0.5 * marble
            }
            Texture::Image(image) => image.sample(u, v),
        }
    }
}

/// Linear RGB bitmap with nearest-texel lookup.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major, top row first
    pixels: Vec<Color>,
}

impl ImageTexture {
    /// Build from linear RGB pixels, row-major with the top row first.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        if pixels.is_empty() || pixels.len() != width as usize * height as usize {
            log::warn!(
                "Image texture has {} pixels for {}x{}, lookups may fall back to cyan",
                pixels.len(),
                width,
                height
            );
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load an 8-bit image file and convert it from sRGB to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        let pixels = rgb
            .pixels()
            .map(|p| Color::new(srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])))
            .collect();

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);

        Ok(Self::new(width, height, pixels))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest texel at `(u, v)`; `v = 0` is the bottom row.
    ///
    /// A texture without pixel data answers cyan so it stands out in renders.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        if self.pixels.is_empty() || self.width == 0 || self.height == 0 {
            return Color::new(0.0, 1.0, 1.0);
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f64) as u32).min(self.width - 1);
        let j = ((v * self.height as f64) as u32).min(self.height - 1);

        self.pixels
            .get((j * self.width + i) as usize)
            .copied()
            .unwrap_or(Color::new(0.0, 1.0, 1.0))
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f64 {
    let v = value as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
