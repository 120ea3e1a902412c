// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Types
// (C) 2026 The ONTO Kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Data model, versioned rulesets, configuration and error hierarchy
//! for the ONTO epistemic kernel.

pub mod config;
pub mod error;
pub mod record;
pub mod result;
pub mod ruleset;
pub mod score;
pub mod vocabulary;

pub use config::EngineConfig;
pub use error::{OntoError, OntoResult};
pub use record::{GroundTruth, Label, Prediction};
pub use result::{EvaluationParts, EvaluationResult, SampleWarning};
pub use ruleset::{ComplianceLevel, Domain, RiskLevel, Ruleset, DEFAULT_RULESET_VERSION};
pub use score::{
    CalibrationBin, CalibrationReport, CategoryCount, ClassMetrics, ComplianceScorecard,
    RiskAssessment, SelectiveReport, TextScore,
};
pub use vocabulary::{Category, MatchKind, Vocabulary};
