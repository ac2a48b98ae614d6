//! Infinite plane primitive, the local shape of plane geometry nodes.

use crate::HitPoint;
use lux_math::{Ray, Vec2, Vec3};

/// A plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane; the normal is normalized.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Intersect the plane. Rays parallel to the plane never hit.
    pub fn intersect(&self, ray: &Ray) -> Option<HitPoint> {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t < 0.0 {
            return None;
        }

        Some(HitPoint::new(ray.at(t), self.normal, t, denom < 0.0, Vec2::ZERO))
    }
}
