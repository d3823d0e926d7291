//! Render configuration loaded from JSON.

use std::path::{Path, PathBuf};

use ember_math::{Color, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::camera::{Camera, Projection};
use crate::presets::Preset;
use crate::sampler::SamplePattern;

/// Errors that can occur while loading a render configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to render one image. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    pub sampling: SamplePattern,
    /// Color of rays that escape the scene
    pub background: [f64; 3],
    /// Base seed for every per-pixel random stream
    pub seed: u64,
    pub preset: Preset,
    pub camera: CameraConfig,
    pub bucket_size: u32,
    /// Output image path, format chosen from the extension
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 112,
            max_depth: 50,
            sampling: SamplePattern::default(),
            background: [0.8, 0.9, 0.99],
            seed: 0,
            preset: Preset::default(),
            camera: CameraConfig::default(),
            bucket_size: DEFAULT_BUCKET_SIZE,
            output: PathBuf::from("render.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f64; 3],
    pub look_at: [f64; 3],
    pub up: [f64; 3],
    /// Distance from the eye to the view plane
    pub focal_distance: f64,
    /// Width of the view plane in world units
    pub viewport_width: f64,
    /// Shutter open and close times
    pub time0: f64,
    pub time1: f64,
    pub projection: Projection,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 0.0],
            look_at: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            focal_distance: 3.5,
            viewport_width: 4.0,
            time0: 0.0,
            time1: 1.0,
            projection: Projection::Perspective,
        }
    }
}

impl RenderConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid("bucket_size must be non-zero".to_string()));
        }
        if let SamplePattern::MultiJitter { fine_grid: 0 } = self.sampling {
            return Err(ConfigError::Invalid("fine_grid must be at least 1".to_string()));
        }

        let cam = &self.camera;
        let forward = Vec3::from(cam.eye) - Vec3::from(cam.look_at);
        if forward.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("camera eye and look_at coincide".to_string()));
        }
        if Vec3::from(cam.up).cross(forward).length_squared() == 0.0 {
            return Err(ConfigError::Invalid(
                "camera up is parallel to the view direction".to_string(),
            ));
        }
        if cam.viewport_width <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "viewport_width must be positive, got {}",
                cam.viewport_width
            )));
        }

        Ok(())
    }

    pub fn background_color(&self) -> Color {
        Color::from(self.background)
    }

    /// Camera described by the `camera` block at this config's resolution.
    pub fn build_camera(&self) -> Camera {
        let cam = &self.camera;
        Camera::new(
            Vec3::from(cam.eye),
            Vec3::from(cam.look_at),
            Vec3::from(cam.up),
            cam.focal_distance,
            self.width,
            self.height,
            cam.viewport_width,
        )
        .with_shutter(cam.time0, cam.time1)
        .with_projection(cam.projection)
    }
}
