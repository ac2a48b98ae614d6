//! Hit record for ray-surface intersections.

use lux_math::{Mat4, Mat4Ext, Vec2, Vec3};

/// Record of a ray-surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPoint {
    /// Point of intersection
    pub point: Vec3,
    /// Geometric (or interpolated) normal, unit length; never flipped toward the ray
    pub normal: Vec3,
    /// Ray parameter where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the outside of the surface
    pub front_hit: bool,
    /// UV texture coordinates
    pub uv: Vec2,
}

impl HitPoint {
    /// "No hit": infinite `t` and a zero normal.
    pub const INVALID: HitPoint = HitPoint {
        point: Vec3::ZERO,
        normal: Vec3::ZERO,
        t: f32::INFINITY,
        front_hit: false,
        uv: Vec2::ZERO,
    };

    pub fn new(point: Vec3, normal: Vec3, t: f32, front_hit: bool, uv: Vec2) -> Self {
        Self {
            point,
            normal,
            t,
            front_hit,
            uv,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    /// Map a local-space hit to world space.
    ///
    /// The normal goes through the transpose of `world_to_local` and is
    /// re-normalized; `t` is unchanged because rays are never re-normalized
    /// when moved between frames.
    pub fn to_world(&self, local_to_world: &Mat4, world_to_local: &Mat4) -> HitPoint {
        HitPoint {
            point: local_to_world.transform_point3(self.point),
            normal: world_to_local.transform_normal(self.normal),
            ..*self
        }
    }
}

impl Default for HitPoint {
    fn default() -> Self {
        Self::INVALID
    }
}
