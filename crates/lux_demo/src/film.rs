//! Pinhole film: turns pixel coordinates into camera rays.

use lux_math::{Mat4, Ray, Vec3};
use lux_tracer::{Pcg32, Sampler};

/// A pinhole camera looking down its local +Z axis.
///
/// Pixel (0, 0) is the top-left corner of the image.
#[derive(Debug, Clone)]
pub struct Film {
    pub width: u32,
    pub height: u32,
    camera_to_world: Mat4,
    /// Half extents of the film plane at distance 1
    half_size: (f32, f32),
    sampler: Sampler,
}

impl Film {
    pub fn new(width: u32, height: u32, field_of_view: f32, sampler: Sampler) -> Self {
        let half_height = (0.5 * field_of_view.to_radians()).tan();
        let half_width = half_height * width as f32 / height as f32;

        Self {
            width,
            height,
            camera_to_world: Mat4::IDENTITY,
            half_size: (half_width, half_height),
            sampler,
        }
    }

    /// Place the camera at `eye` looking at `target`.
    pub fn with_look_at(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        self.camera_to_world = Mat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            forward.extend(0.0),
            eye.extend(1.0),
        );
        self
    }

    pub fn sample_count(&self) -> usize {
        self.sampler.sample_count()
    }

    pub fn position(&self) -> Vec3 {
        self.camera_to_world.w_axis.truncate()
    }

    /// Ray through sample `sample_index` of pixel (`x`, `y`).
    pub fn generate_ray(&self, x: u32, y: u32, sample_index: usize, rng: &mut Pcg32) -> Ray {
        let offset = self.sampler.sample(sample_index, rng);
        let (half_width, half_height) = self.half_size;

        let u = (x as f32 + offset.x) / self.width as f32;
        let v = (y as f32 + offset.y) / self.height as f32;

        let local = Vec3::new(
            -half_width + 2.0 * half_width * u,
            half_height - 2.0 * half_height * v,
            1.0,
        )
        .normalize();

        Ray::new(self.position(), self.camera_to_world.transform_vector3(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let film = Film::new(101, 51, 60.0, Sampler::center()).with_look_at(
            Vec3::new(0.0, 1.0, -5.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::Y,
        );
        let mut rng = Pcg32::new(0);
        let ray = film.generate_ray(50, 25, 0, &mut rng);

        assert_eq!(ray.origin, Vec3::new(0.0, 1.0, -5.0));
        assert!((ray.direction - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_top_left_ray_is_up_and_left() {
        let film = Film::new(100, 100, 90.0, Sampler::center()).with_look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y);
        let mut rng = Pcg32::new(0);
        let ray = film.generate_ray(0, 0, 0, &mut rng);

        // Looking down -Z with +Y up, screen left is -X
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }
}
