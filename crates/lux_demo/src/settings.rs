//! Render settings, optionally read from a JSON file.

use anyhow::{Context, Result};
use lux_tracer::TraceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which integrator produces each camera sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Recursive ray tracing with direct lighting and mirrors
    RayTrace,
    /// Monte-Carlo path tracing
    PathTrace,
}

/// Everything the demo needs to know besides the scene itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Pixel samples are a stratified `n x n` grid
    pub pixel_samples: usize,
    /// Camera samples per pixel sample; only useful for path tracing
    pub passes: u32,
    pub integrator: Integrator,
    pub bucket_size: u32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub output: String,
    pub trace: TraceConfig,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            pixel_samples: 2,
            passes: 16,
            integrator: Integrator::PathTrace,
            bucket_size: 32,
            field_of_view: 60.0,
            output: "lux.png".to_string(),
            trace: TraceConfig::default(),
        }
    }
}

impl RenderSettings {
    /// Read settings from `path`; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: RenderSettings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.width > 0 && self.height > 0, "Image size must be non-zero");
        anyhow::ensure!(self.pixel_samples > 0, "pixel_samples must be at least 1");
        anyhow::ensure!(self.passes > 0, "passes must be at least 1");
        anyhow::ensure!(self.bucket_size > 0, "bucket_size must be at least 1");
        anyhow::ensure!(
            self.field_of_view > 0.0 && self.field_of_view < 180.0,
            "field_of_view must be between 0 and 180 degrees"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "width": 64,
            "integrator": "ray_trace",
            "trace": { "max_depth": 3 }
        }"#;
        let settings: RenderSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 240);
        assert_eq!(settings.integrator, Integrator::RayTrace);
        assert_eq!(settings.trace.max_depth, 3);
        assert!(settings.trace.use_mis);
    }

    #[test]
    fn test_rejects_zero_size() {
        let settings = RenderSettings {
            width: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
