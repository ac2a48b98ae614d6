//! Scene construction errors.
//!
//! Nothing in the per-ray path returns an error; these are raised only while
//! a scene snapshot is being assembled.

use thiserror::Error;

/// Errors that can occur while building a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Scene has zero total light power ({light_count} lights); no light can be selected")]
    ZeroLightPower { light_count: usize },

    #[error("Light {index} has invalid power {power} (must be finite and non-negative)")]
    InvalidLightPower { index: usize, power: f32 },

    #[error("Transform of {what} is not invertible")]
    SingularTransform { what: &'static str },

    #[error("Geometry {geometry} references light {light}, but only {light_count} lights exist")]
    DanglingLightIndex {
        geometry: usize,
        light: usize,
        light_count: usize,
    },

    #[error("Sampler needs at least one sample")]
    EmptySampler,

    #[error("Texture is {width}x{height} but has {pixels} pixels")]
    TextureSize { width: u32, height: u32, pixels: usize },

    #[error("Mesh index {index} is out of range for {vertices} vertices")]
    MeshIndex { index: u32, vertices: usize },

    #[error("Invalid trace configuration: {0}")]
    InvalidConfig(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_power_message_is_descriptive() {
        let err = SceneError::ZeroLightPower { light_count: 2 };
        let msg = err.to_string();
        assert!(msg.contains("zero total light power"));
        assert!(msg.contains("2 lights"));
    }
}
