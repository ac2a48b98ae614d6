//! Origin-centered sphere primitive.

use crate::HitPoint;
use lux_math::{Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// Radius of the sphere every `Sphere` geometry node uses in local space.
pub const SPHERE_RADIUS: f32 = 0.5;

/// Get the UV coordinates for a point on the unit sphere.
fn sphere_uv(p: Vec3) -> Vec2 {
    // theta: angle down from +Y
    // phi: angle around Y axis from +X
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    Vec2::new(phi / (2.0 * PI), theta / PI)
}

/// Intersect `ray` with the sphere of `radius` centered at the origin.
///
/// Solves `a t² + b t + c = 0` and returns the smallest non-negative root.
/// A hit on the far side (origin inside) has `front_hit == false`.
pub fn intersect_sphere(radius: f32, ray: &Ray) -> Option<HitPoint> {
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let b = 2.0 * ray.direction.dot(ray.origin);
    let c = ray.origin.length_squared() - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let near = (-b - sqrtd) / (2.0 * a);
    let far = (-b + sqrtd) / (2.0 * a);

    let (t, front_hit) = if near >= 0.0 {
        (near, true)
    } else if far >= 0.0 {
        (far, false)
    } else {
        return None;
    };

    let point = ray.at(t);
    let normal = point / radius;

    Some(HitPoint::new(point, normal, t, front_hit, sphere_uv(normal)))
}
