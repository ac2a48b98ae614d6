// Transform utilities for Mat4
//
// Extends glam::Mat4 with the operations the tracer needs when moving hits
// between a node's local frame and world space.
// Note: glam::Mat4 already provides transform_point3(), transform_vector3()
// and inverse()

use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal by the transpose of `self`.
    ///
    /// `self` must be the inverse of the matrix that transforms points
    /// (e.g. world-to-local when mapping a local normal to world space).
    /// The result is normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Translation column as a point.
    fn translation(&self) -> Vec3;

    /// Returns true when the matrix can be inverted reliably.
    fn is_invertible(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.transpose().transform_vector3(normal).normalize_or_zero()
    }

    fn translation(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > 1e-12
    }
}
