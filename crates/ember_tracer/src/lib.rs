//! Ember tracer - CPU path tracing.
//!
//! A naive recursive Monte Carlo path tracer: rays bounce through a BVH of
//! analytic primitives and scatter off materials until they escape to the
//! background, hit an emitter, or run out of depth.

mod bucket;
mod bvh;
mod camera;
mod config;
mod hittable;
mod material;
mod plane;
mod presets;
mod rectangle;
mod renderer;
mod sampler;
mod scene;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhChild, BvhNode};
pub use camera::{Camera, Projection};
pub use config::{CameraConfig, ConfigError, RenderConfig};
pub use hittable::{HitRecord, MaterialId, Primitive, PrimitiveId};
pub use material::{reflectance, Material, ScatterResult};
pub use plane::Plane;
pub use presets::Preset;
pub use rectangle::Rectangle;
pub use renderer::{
    color_to_rgba, linear_to_gamma, pixel_rng, radiance, render, render_pixel, ImageBuffer, T_MIN,
};
pub use sampler::{multi_jitter, SampleGrid, SampleOffsets, SamplePattern};
pub use scene::{Scene, SceneBuilder};
pub use sphere::{MovingSphere, Sphere};
pub use triangle::Triangle;

/// Re-export math and surface types used in the public API
pub use ember_core::{Mesh, Texture};
pub use ember_math::{Aabb, Color, Interval, Ray, Vec3};
