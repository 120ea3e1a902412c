// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Input Records
// ─────────────────────────────────────────────────────────────────────
//! Prediction and ground-truth records, plus the closed label set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OntoError, OntoResult};

/// Epistemic status of an item. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Known,
    Unknown,
    Contradiction,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Known, Label::Unknown, Label::Contradiction];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Known => "KNOWN",
            Label::Unknown => "UNKNOWN",
            Label::Contradiction => "CONTRADICTION",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    /// Exact, case-sensitive match against the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KNOWN" => Ok(Label::Known),
            "UNKNOWN" => Ok(Label::Unknown),
            "CONTRADICTION" => Ok(Label::Contradiction),
            other => Err(format!(
                "unrecognised label {other:?} (expected KNOWN, UNKNOWN or CONTRADICTION)"
            )),
        }
    }
}

/// One model prediction for one evaluated item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub label: Label,
    /// Stated confidence in `label`, in [0, 1].
    pub confidence: f64,
}

impl Prediction {
    /// Build a validated prediction.
    pub fn new(id: impl Into<String>, label: Label, confidence: f64) -> OntoResult<Self> {
        let prediction = Self {
            id: id.into(),
            label,
            confidence,
        };
        prediction.validate()?;
        Ok(prediction)
    }

    /// Reject empty ids and confidences outside [0, 1] (NaN included).
    /// Values are never clamped.
    pub fn validate(&self) -> OntoResult<()> {
        validate_id(&self.id)?;
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(OntoError::schema(
                &self.id,
                "confidence",
                format!("must be in [0, 1], got {}", self.confidence),
            ));
        }
        Ok(())
    }
}

/// Reference label for one evaluated item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub id: String,
    pub label: Label,
}

impl GroundTruth {
    pub fn new(id: impl Into<String>, label: Label) -> OntoResult<Self> {
        let truth = Self {
            id: id.into(),
            label,
        };
        truth.validate()?;
        Ok(truth)
    }

    pub fn validate(&self) -> OntoResult<()> {
        validate_id(&self.id)
    }
}

fn validate_id(id: &str) -> OntoResult<()> {
    if id.trim().is_empty() {
        return Err(OntoError::schema("<empty>", "id", "id must be a non-empty string"));
    }
    Ok(())
}
