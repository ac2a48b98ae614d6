use crate::{Mat4, Vec3};

/// A ray in 3D space with an origin point and a direction vector.
///
/// The direction is not required to be normalized. Transforming a ray keeps
/// the origin as a point (w=1) and the direction as a vector (w=0), so the
/// ray parameter `t` of a hit is the same in every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by `matrix` (origin as a point, direction as a vector).
    pub fn transform(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Precompute the reciprocal direction for slab tests.
    #[inline]
    pub fn inv_dir(&self) -> RayInvDir {
        RayInvDir {
            origin: self.origin,
            inv_dir: self.direction.recip(),
        }
    }
}

/// A ray origin with a precomputed reciprocal direction.
///
/// Zero direction components become infinities, which the slab test handles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayInvDir {
    pub origin: Vec3,
    pub inv_dir: Vec3,
}
