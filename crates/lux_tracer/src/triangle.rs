//! Triangle primitive for ray tracing.
//!
//! Intersection solves `origin + t * dir = P0 + u * e1 + v * e2` with
//! Cramer's rule. Hits with `t <= 0` are rejected; the BVH further requires
//! `t` to lie in its open accepted range.

use crate::HitPoint;
use lux_math::{Aabb, Ray, Vec2, Vec3};

/// Relative threshold below which a ray counts as parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A triangle with per-vertex normals and texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

impl Triangle {
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            positions,
            normals,
            uvs,
        }
    }

    /// Triangle whose vertex normals all equal the face normal.
    pub fn flat(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let n = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        Self::new([p0, p1, p2], [n; 3], [Vec2::ZERO; 3])
    }

    /// Counter-clockwise face normal (unit length, zero when degenerate).
    pub fn face_normal(&self) -> Vec3 {
        let [p0, p1, p2] = self.positions;
        (p1 - p0).cross(p2 - p0).normalize_or_zero()
    }

    pub fn area(&self) -> f32 {
        let [p0, p1, p2] = self.positions;
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    pub fn bounds(&self) -> Aabb {
        let [p0, p1, p2] = self.positions;
        Aabb::from_points(p0, p1).encapsulate_point(p2)
    }

    /// Intersect with `ray`; `front_hit` is true when the ray travels against
    /// the counter-clockwise face normal.
    pub fn intersect(&self, ray: &Ray) -> Option<HitPoint> {
        let [p0, p1, p2] = self.positions;
        let dir = ray.direction;

        let r = ray.origin - p0;
        let e1 = p1 - p0;
        let e2 = p2 - p0;

        let n = e2.cross(e1);
        let denom = dir.dot(n);
        if denom.abs() <= PARALLEL_EPSILON * dir.length() * n.length() {
            return None;
        }
        let inv_denom = 1.0 / denom;

        let u = inv_denom * dir.dot(e2.cross(r));
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let v = inv_denom * dir.dot(r.cross(e1));
        if !(0.0..=1.0).contains(&v) || u + v > 1.0 {
            return None;
        }

        let t = inv_denom * r.dot(e1.cross(e2));
        if t <= 0.0 {
            return None;
        }

        let w = 1.0 - u - v;
        let normal = (w * self.normals[0] + u * self.normals[1] + v * self.normals[2])
            .try_normalize()
            .unwrap_or_else(|| self.face_normal());
        let uv = w * self.uvs[0] + u * self.uvs[1] + v * self.uvs[2];

        Some(HitPoint::new(ray.at(t), normal, t, denom > 0.0, uv))
    }
}
