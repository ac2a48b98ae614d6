//! Box primitive: full slab test with face normal and UV.

use crate::HitPoint;
use lux_math::{Aabb, Ray};

/// Intersect `ray` with `aabb`, reporting the face normal and UV of the hit.
///
/// When the origin is inside the box the exit point is returned with
/// `front_hit == false`; the normal still points outward.
pub fn intersect_box(aabb: &Aabb, ray: &Ray) -> Option<HitPoint> {
    let slab = aabb.intersect_fast(&ray.inv_dir())?;
    let point = ray.at(slab.t);
    let (normal, uv) = aabb.face_at(point);

    Some(HitPoint::new(point, normal, slab.t, slab.front_hit, uv))
}
