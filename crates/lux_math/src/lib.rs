// Re-export glam for convenience
pub use glam::*;

// Lux math types
mod aabb;
mod frame;
mod interval;
mod ray;
mod transform;

pub use aabb::{Aabb, SlabHit};
pub use frame::Frame;
pub use interval::Interval;
pub use ray::{Ray, RayInvDir};
pub use transform::Mat4Ext;

/// Reflect `v` about the unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Relative luminance of a linear RGB color (Rec. 709 weights).
#[inline]
pub fn luminance(color: Vec3) -> f32 {
    color.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_flips_normal_component() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let r = reflect(v, Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_reflect_preserves_length() {
        let v = Vec3::new(0.3, -0.8, 0.5);
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((reflect(v, n).length() - v.length()).abs() < 1e-5);
    }

    #[test]
    fn test_luminance_of_white_is_one() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-5);
        assert_eq!(luminance(Vec3::ZERO), 0.0);
    }
}
