//! Ember Core - surface inputs consumed by the tracer.
//!
//! This crate provides:
//!
//! - **Textures**: the `value(u, v, p) -> Color` contract and its solid,
//!   checker, Perlin marble and image implementations
//! - **Meshes**: indexed triangle meshes with computed vertex normals
//! - **Random sampling**: uniform draws over explicit generator handles
//!
//! # Example
//!
//! ```ignore
//! use ember_core::Texture;
//! use ember_math::Color;
//!
//! let floor = Texture::checker(Color::new(0.3, 0.4, 0.5), Color::splat(0.9));
//! let albedo = floor.value(0.0, 0.0, ember_math::Vec3::new(0.1, 0.2, 0.3));
//! ```

pub mod mesh;
pub mod perlin;
pub mod random;
pub mod texture;

// Re-export commonly used types
pub use mesh::Mesh;
pub use perlin::Perlin;
pub use texture::{ImageTexture, Texture, TextureError, TextureResult};
