//! Diffuse textures for materials.
//!
//! Pixels are linear RGB in row-major order with texel (0, 0) at the start of
//! the buffer. Decoding image files is left to the host; [`Texture::from_image`]
//! converts an already decoded `image::RgbImage`.

use crate::{SceneError, SceneResult};
use lux_math::{Vec2, Vec3};

/// Nearest-neighbour texture. An empty texture samples as white.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,

    /// Linear RGB pixels, `width * height` of them
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Create a texture, checking the pixel count against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> SceneResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(SceneError::TextureSize {
                width,
                height,
                pixels: pixels.len(),
            });
        }

        Ok(Self { width, height, pixels })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
        }
    }

    /// Convert an 8-bit sRGB image to a linear texture.
    pub fn from_image(image: &image::RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| Vec3::new(srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])))
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the texture has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Nearest-neighbour lookup. UVs are clamped into `[0, 1)`.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        if self.is_empty() {
            return Vec3::ONE;
        }

        let uv = uv.clamp(Vec2::ZERO, Vec2::splat(0.99999));
        let x = (uv.x * self.width as f32) as usize;
        let y = (uv.y * self.height as f32) as usize;

        self.pixels[x + y * self.width as usize]
    }
}

fn srgb_to_linear(value: u8) -> f32 {
    let c = value as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_texture_is_white() {
        let texture = Texture::default();
        assert!(texture.is_empty());
        assert_eq!(texture.sample(Vec2::new(0.3, 0.7)), Vec3::ONE);
    }

    #[test]
    fn test_size_mismatch() {
        let err = Texture::new(2, 2, vec![Vec3::ZERO; 3]).unwrap_err();
        assert_eq!(
            err,
            SceneError::TextureSize {
                width: 2,
                height: 2,
                pixels: 3
            }
        );
    }

    #[test]
    fn test_nearest_lookup_and_clamp() {
        let pixels = vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
        let texture = Texture::new(2, 2, pixels).unwrap();

        assert_eq!(texture.sample(Vec2::new(0.1, 0.1)), Vec3::X);
        assert_eq!(texture.sample(Vec2::new(0.9, 0.1)), Vec3::Y);
        assert_eq!(texture.sample(Vec2::new(0.1, 0.9)), Vec3::Z);
        // Out-of-range UVs land on the edge texels
        assert_eq!(texture.sample(Vec2::new(1.5, 1.5)), Vec3::ONE);
        assert_eq!(texture.sample(Vec2::new(-1.0, -1.0)), Vec3::X);
    }

    #[test]
    fn test_dimensions_match_construction() {
        let texture = Texture::new(3, 1, vec![Vec3::ONE; 3]).unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 1));
        assert!(!texture.is_empty());

        let solid = Texture::solid_color(Vec3::X);
        assert_eq!((solid.width(), solid.height()), (1, 1));
    }

    #[test]
    fn test_from_image_linearizes() {
        let image = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 128]));
        let texture = Texture::from_image(&image);
        assert_eq!((texture.width(), texture.height()), (1, 1));

        let c = texture.sample(Vec2::ZERO);
        assert!((c.x - 1.0).abs() < 1e-5);
        assert_eq!(c.y, 0.0);
        assert!((c.z - 0.2158).abs() < 1e-3);
    }
}
