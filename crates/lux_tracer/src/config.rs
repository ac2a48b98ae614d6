//! Trace configuration.

use crate::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};

/// Integrator settings shared by every ray of a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Recursion limit of the recursive ray tracer
    pub max_depth: u32,
    /// Russian-roulette termination probability per bounce; its length
    /// bounds the path length
    pub termination_probabilities: Vec<f32>,
    /// Raise termination probability for paths with low throughput
    pub terminate_on_luminance: bool,
    /// Combine light and BRDF sampling with the balance heuristic
    pub use_mis: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            termination_probabilities: vec![0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 0.4, 0.5],
            terminate_on_luminance: false,
            use_mis: true,
        }
    }
}

impl TraceConfig {
    /// Every termination probability must lie in `[0, 1]`.
    pub fn validate(&self) -> SceneResult<()> {
        for (depth, &p) in self.termination_probabilities.iter().enumerate() {
            if !(0.0..=1.0).contains(&p) {
                return Err(SceneError::InvalidConfig(format!(
                    "termination probability {p} at bounce {depth} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Number of bounces a path may take.
    pub fn max_bounces(&self) -> usize {
        self.termination_probabilities.len()
    }
}
