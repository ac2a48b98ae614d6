//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each pixel sample gets its own
//! `TraceContext`, so workers share nothing but the read-only `World`.

use crate::film::Film;
use crate::settings::{Integrator, RenderSettings};
use lux_tracer::{Color, TraceContext, World};
use rayon::prelude::*;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
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
}

/// Generate buckets for an image, sorted from the center outward.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let dy = b.y as f32 + b.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Average radiance of pixel (`x`, `y`) over every film sample and pass.
pub fn render_pixel(film: &Film, world: &World, settings: &RenderSettings, x: u32, y: u32) -> Color {
    let mut color = Color::ZERO;
    let mut count = 0u32;

    for pass in 0..settings.passes {
        for sample_index in 0..film.sample_count() {
            let seed = pass * film.sample_count() as u32 + sample_index as u32;
            let mut ctx = TraceContext::for_sample(x, y, seed);

            let ray = film.generate_ray(x, y, sample_index, &mut ctx.rng);
            color += match settings.integrator {
                Integrator::RayTrace => world.trace_ray(&mut ctx, &ray),
                Integrator::PathTrace => world.trace_path(&mut ctx, &ray),
            };
            count += 1;
        }
    }

    color / count as f32
}

/// Render a single bucket; pixels come back in row-major order.
pub fn render_bucket(bucket: &Bucket, film: &Film, world: &World, settings: &RenderSettings) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(render_pixel(film, world, settings, bucket.x + local_x, bucket.y + local_y));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

/// Render every bucket in parallel.
pub fn render_buckets(buckets: &[Bucket], film: &Film, world: &World, settings: &RenderSettings) -> Vec<BucketResult> {
    buckets
        .par_iter()
        .map(|bucket| BucketResult {
            bucket: *bucket,
            pixels: render_bucket(bucket, film, world, settings),
        })
        .collect()
}
