//! 2-D sample-point strategies for pixel anti-aliasing and area lights.

use crate::error::{SceneError, SceneResult};
use crate::rng::Pcg32;
use lux_math::Vec2;
use serde::{Deserialize, Serialize};

/// How a [`Sampler`] produces its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplerKind {
    /// A precomputed, deterministic point table.
    FixedPoints,
    /// Cell centers of a regular grid jittered within their cell.
    Stratified,
    /// Fresh uniform points on every call.
    FullRandom,
}

/// Produces points in the unit square `[0, 1)²`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    kind: SamplerKind,
    sample_count: usize,
    points: Vec<Vec2>,
    pitch: Vec2,
}

impl Sampler {
    /// A single sample at the center of the square.
    pub fn center() -> Self {
        Self {
            kind: SamplerKind::FixedPoints,
            sample_count: 1,
            points: vec![Vec2::splat(0.5)],
            pitch: Vec2::ONE,
        }
    }

    /// Fixed cell centers of a `rows` x `columns` grid.
    pub fn regular(rows: usize, columns: usize) -> SceneResult<Self> {
        let (points, pitch) = grid(rows, columns)?;
        Ok(Self {
            kind: SamplerKind::FixedPoints,
            sample_count: points.len(),
            points,
            pitch,
        })
    }

    /// Grid cell centers jittered by up to half a cell on every call.
    pub fn stratified(rows: usize, columns: usize) -> SceneResult<Self> {
        let (points, pitch) = grid(rows, columns)?;
        Ok(Self {
            kind: SamplerKind::Stratified,
            sample_count: points.len(),
            points,
            pitch,
        })
    }

    /// Fixed points from the Halton sequence in bases 2 and 3.
    pub fn halton(sample_count: usize) -> SceneResult<Self> {
        if sample_count == 0 {
            return Err(SceneError::EmptySampler);
        }
        let points = (1..=sample_count)
            .map(|i| Vec2::new(radical_inverse(2, i), radical_inverse(3, i)))
            .collect();
        Ok(Self {
            kind: SamplerKind::FixedPoints,
            sample_count,
            points,
            pitch: Vec2::ONE,
        })
    }

    /// Independent uniform points.
    pub fn random(sample_count: usize) -> SceneResult<Self> {
        if sample_count == 0 {
            return Err(SceneError::EmptySampler);
        }
        Ok(Self {
            kind: SamplerKind::FullRandom,
            sample_count,
            points: Vec::new(),
            pitch: Vec2::ONE,
        })
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Point `index` of this sampler. `index` wraps around `sample_count`.
    pub fn sample(&self, index: usize, rng: &mut Pcg32) -> Vec2 {
        match self.kind {
            SamplerKind::FixedPoints => self.points[index % self.points.len()],
            SamplerKind::Stratified => {
                let jitter = (rng.unit_square() - 0.5) * self.pitch;
                self.points[index % self.points.len()] + jitter
            }
            SamplerKind::FullRandom => rng.unit_square(),
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::center()
    }
}

fn grid(rows: usize, columns: usize) -> SceneResult<(Vec<Vec2>, Vec2)> {
    if rows == 0 || columns == 0 {
        return Err(SceneError::EmptySampler);
    }
    let pitch = Vec2::new(1.0 / columns as f32, 1.0 / rows as f32);
    let points = (0..rows)
        .flat_map(|iy| {
            (0..columns).map(move |ix| Vec2::new((ix as f32 + 0.5) * pitch.x, (iy as f32 + 0.5) * pitch.y))
        })
        .collect();
    Ok((points, pitch))
}

/// Van der Corput radical inverse of `index` in `base`.
fn radical_inverse(base: usize, mut index: usize) -> f32 {
    let mut result = 0.0;
    let mut f = 1.0;
    while index > 0 {
        f /= base as f32;
        result += f * (index % base) as f32;
        index /= base;
    }
    result
}
