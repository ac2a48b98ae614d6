use crate::{Mat3, Vec3};

/// Orthonormal basis whose local +Z is a given axis.
///
/// Maps hemisphere samples (z up) into world directions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    basis: Mat3,
}

impl Frame {
    /// Build a frame around the unit vector `axis`.
    pub fn new(axis: Vec3) -> Self {
        let mut tangent = Vec3::X;
        if tangent.dot(axis).abs() > 0.9 {
            tangent = Vec3::Y;
        }

        let binormal = axis.cross(tangent).normalize();
        let tangent = binormal.cross(axis);

        Self {
            basis: Mat3::from_cols(tangent, binormal, axis),
        }
    }

    /// Local direction to world direction (normalized).
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        (self.basis * local).normalize()
    }
}
