//! Lux demo - renders the demo room to a PNG.
//!
//! Usage: `lux_demo [settings.json]`. Without a settings file the defaults
//! from [`RenderSettings`] are used.

mod bucket;
mod film;
mod framebuffer;
mod scene;
mod settings;

use anyhow::{Context, Result};
use bucket::{generate_buckets, render_buckets};
use film::Film;
use framebuffer::ImageBuffer;
use lux_math::Vec3;
use lux_tracer::Sampler;
use settings::RenderSettings;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => RenderSettings::load(Path::new(&path))?,
        None => RenderSettings::default(),
    };
    log::info!(
        "Rendering {}x{} with {:?}, {}x{} samples x {} passes",
        settings.width,
        settings.height,
        settings.integrator,
        settings.pixel_samples,
        settings.pixel_samples,
        settings.passes
    );

    let start = Instant::now();
    let world = scene::build_demo_scene(settings.trace.clone()).context("Failed to build demo scene")?;
    log::info!("Scene built in {:?}", start.elapsed());

    let sampler = Sampler::stratified(settings.pixel_samples, settings.pixel_samples)
        .context("Invalid pixel sample count")?;
    let film = Film::new(settings.width, settings.height, settings.field_of_view, sampler).with_look_at(
        scene::CAMERA_EYE,
        scene::CAMERA_TARGET,
        Vec3::Y,
    );

    let buckets = generate_buckets(settings.width, settings.height, settings.bucket_size);
    log::debug!("{} buckets of {} pixels", buckets.len(), settings.bucket_size);

    let start = Instant::now();
    let results = render_buckets(&buckets, &film, &world, &settings);
    log::info!("Rendered in {:?}", start.elapsed());

    let mut image = ImageBuffer::new(settings.width, settings.height);
    for result in &results {
        image.write_bucket(result);
    }
    log::debug!("Mean radiance {}", image.mean());

    image
        .to_rgb_image()
        .save(&settings.output)
        .with_context(|| format!("Failed to write {}", settings.output))?;
    log::info!("Saved {}", settings.output);

    Ok(())
}
