//! Ember command-line renderer.
//!
//! Usage: `ember [CONFIG.json] [OUTPUT]`
//!
//! Without a config file the built-in defaults are used. `--print-config`
//! writes the default configuration as JSON and exits.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use ember_tracer::{render, ImageBuffer, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        let json = serde_json::to_string_pretty(&RenderConfig::default())?;
        println!("{json}");
        return Ok(());
    }
    if args.len() > 2 {
        bail!("usage: ember [CONFIG.json] [OUTPUT]");
    }

    let mut config = match args.first() {
        Some(path) => RenderConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => {
            log::info!("No config given, using defaults");
            RenderConfig::default()
        }
    };
    if let Some(output) = args.get(1) {
        config.output = PathBuf::from(output);
    }

    log::info!("Starting Ember: preset '{}'", config.preset.name());

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let scene = config.preset.build(config.background_color(), &mut rng);
    log::info!("Scene ready in {:.2?}", start.elapsed());

    let camera = config.build_camera();
    let image = render(&scene, &camera, &config);

    save_image(&image, &config.output)?;
    log::info!("Wrote {}", config.output.display());

    Ok(())
}

/// Encode the framebuffer; the format follows the file extension.
fn save_image(framebuffer: &ImageBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(framebuffer.width, framebuffer.height, framebuffer.to_rgba())
        .context("framebuffer size does not match its dimensions")?;

    // Drop alpha so formats without it (JPEG, PPM) work too
    image::DynamicImage::ImageRgba8(rgba)
        .to_rgb8()
        .save(path)
        .with_context(|| format!("writing image {}", path.display()))?;
    Ok(())
}
