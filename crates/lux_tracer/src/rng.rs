//! Deterministic 32-bit PCG-style random number generator.
//!
//! Each in-flight path owns one of these (inside its `TraceContext`), so no
//! generator state is ever shared between threads.

use lux_math::{Vec2, Vec3};
use rand::{RngCore, SeedableRng};
use std::f32::consts::PI;

/// PCG-style generator: LCG state step followed by a multiply-xorshift output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcg32 {
    state: u32,
}

impl Pcg32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from a pixel coordinate and sample index.
    pub fn for_sample(x: u32, y: u32, sample: u32) -> Self {
        let mut rng = Self::new(x.wrapping_mul(1973) ^ y.wrapping_mul(9277) ^ sample.wrapping_mul(26699));
        rng.next_u32();
        rng
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747796405).wrapping_add(2891336453);
        let s = self.state;
        let word = ((s >> ((s >> 28) + 4)) ^ s).wrapping_mul(277803737);
        (word >> 22) ^ word
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fit the f32 mantissa exactly, so 1.0 is never produced.
        (self.step() >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Uniform point in the unit square `[0, 1)²`.
    pub fn unit_square(&mut self) -> Vec2 {
        let x = self.next_f32();
        let y = self.next_f32();
        Vec2::new(x, y)
    }

    /// Uniform direction on the unit sphere (inverse-CDF colatitude/azimuth).
    pub fn unit_sphere(&mut self) -> Vec3 {
        let u = self.next_f32();
        let v = self.next_f32();

        let colatitude = (1.0 - 2.0 * u).acos();
        let azimuth = v * 2.0 * PI;

        Vec3::new(
            azimuth.cos() * colatitude.sin(),
            colatitude.cos(),
            azimuth.sin() * colatitude.sin(),
        )
    }

    /// Uniform index in `[0, n)`. Returns 0 when `n == 0`.
    pub fn index(&mut self, n: usize) -> usize {
        let i = (n as f32 * self.next_f32()) as usize;
        i.min(n.saturating_sub(1))
    }
}

impl Default for Pcg32 {
    fn default() -> Self {
        Self::new(0x853c_49e6)
    }
}

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.step() as u64;
        let hi = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
