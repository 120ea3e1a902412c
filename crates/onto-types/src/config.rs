// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Engine Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{OntoError, OntoResult};
use crate::ruleset::Ruleset;

/// Immutable configuration bound to one evaluator.
///
/// Passed explicitly; there is no process-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of equal-width calibration bins over [0, 1].
    /// Default: 10. Changing it changes ECE; it is reported with every result.
    pub n_bins: usize,

    /// Incorrect items with confidence strictly below this count as
    /// correctly expressed low confidence.
    /// Default: 0.7.
    pub uncertainty_threshold: f64,

    /// Also fail when a ground-truth id has no prediction.
    /// Default: false.
    pub strict_join: bool,

    /// Points on the risk-coverage curve.
    /// Default: 20.
    pub coverage_points: usize,

    /// Confidence thresholds for the abstention analysis.
    /// Default: [0.5, 0.7].
    pub abstention_thresholds: Vec<f64>,

    /// Below this many items a result is flagged as a small sample.
    /// Default: 30.
    pub min_sample_size: usize,

    /// Versioned threshold and vocabulary tables.
    pub ruleset: Ruleset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_bins: 10,
            uncertainty_threshold: 0.7,
            strict_join: false,
            coverage_points: 20,
            abstention_thresholds: vec![0.5, 0.7],
            min_sample_size: 30,
            ruleset: Ruleset::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> OntoResult<()> {
        if self.n_bins < 1 {
            return Err(OntoError::Config(format!(
                "n_bins must be >= 1, got {}",
                self.n_bins
            )));
        }
        if !(0.0..=1.0).contains(&self.uncertainty_threshold) {
            return Err(OntoError::Config(format!(
                "uncertainty_threshold must be in [0, 1], got {}",
                self.uncertainty_threshold
            )));
        }
        if self.coverage_points < 1 {
            return Err(OntoError::Config(format!(
                "coverage_points must be >= 1, got {}",
                self.coverage_points
            )));
        }
        if let Some(t) = self
            .abstention_thresholds
            .iter()
            .find(|t| !(0.0..=1.0).contains(*t))
        {
            return Err(OntoError::Config(format!(
                "abstention thresholds must be in [0, 1], got {t}"
            )));
        }
        self.ruleset.validate()
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> OntoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OntoError::Config(format!("JSON parse error: {e}")))
    }

    pub fn to_json_pretty(&self) -> OntoResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OntoError::Config(format!("JSON encode error: {e}")))
    }
}
