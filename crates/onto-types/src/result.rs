// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Evaluation Result
// ─────────────────────────────────────────────────────────────────────
//! Immutable aggregate produced by one evaluation call.
//!
//! Fields are private: a result is assembled once from
//! [`EvaluationParts`] and afterwards only read. External consumers
//! (report generation, leaderboard storage, certificate signing) use the
//! accessors, [`EvaluationResult::to_map`], [`EvaluationResult::summary`]
//! or [`EvaluationResult::citation`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ruleset::{ComplianceLevel, Domain, RiskLevel};
use crate::score::{
    CalibrationReport, ClassMetrics, ComplianceScorecard, RiskAssessment, SelectiveReport,
};

/// Reasons a result should be read as low-confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleWarning {
    /// Zero items evaluated; every metric is a vacuous default.
    EmptyEvaluation,
    /// No UNKNOWN items in ground truth; U-Recall is vacuously 1.0.
    NoUnknownGroundTruth,
    /// The model never predicted UNKNOWN.
    NoUnknownPredicted,
    /// Fewer items than the configured minimum.
    SmallSample { n: usize, minimum: usize },
}

impl fmt::Display for SampleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleWarning::EmptyEvaluation => write!(f, "empty evaluation set"),
            SampleWarning::NoUnknownGroundTruth => {
                write!(f, "no UNKNOWN items in ground truth (U-Recall is vacuous)")
            }
            SampleWarning::NoUnknownPredicted => write!(f, "model never predicted UNKNOWN"),
            SampleWarning::SmallSample { n, minimum } => {
                write!(f, "small sample: {n} items (minimum {minimum})")
            }
        }
    }
}

/// Inputs for assembling an [`EvaluationResult`].
#[derive(Debug, Clone)]
pub struct EvaluationParts {
    pub ruleset_version: String,
    pub domain: Domain,
    pub n_samples: usize,
    pub per_class: Vec<ClassMetrics>,
    pub unknown_detection: ClassMetrics,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub uncertainty_recall: f64,
    pub uncertainty_threshold: f64,
    pub calibration: CalibrationReport,
    pub selective: SelectiveReport,
    pub risk: RiskAssessment,
    pub compliance: ComplianceLevel,
    pub scorecard: ComplianceScorecard,
    pub regulatory_tags: Vec<String>,
    pub recommendations: Vec<String>,
    pub warnings: Vec<SampleWarning>,
}

/// Immutable aggregate of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    ruleset_version: String,
    domain: Domain,
    n_samples: usize,
    per_class: Vec<ClassMetrics>,
    unknown_detection: ClassMetrics,
    accuracy: f64,
    macro_f1: f64,
    uncertainty_recall: f64,
    uncertainty_threshold: f64,
    calibration: CalibrationReport,
    selective: SelectiveReport,
    risk: RiskAssessment,
    compliance: ComplianceLevel,
    scorecard: ComplianceScorecard,
    regulatory_tags: Vec<String>,
    recommendations: Vec<String>,
    warnings: Vec<SampleWarning>,
}

impl From<EvaluationParts> for EvaluationResult {
    fn from(p: EvaluationParts) -> Self {
        Self {
            ruleset_version: p.ruleset_version,
            domain: p.domain,
            n_samples: p.n_samples,
            per_class: p.per_class,
            unknown_detection: p.unknown_detection,
            accuracy: p.accuracy,
            macro_f1: p.macro_f1,
            uncertainty_recall: p.uncertainty_recall,
            uncertainty_threshold: p.uncertainty_threshold,
            calibration: p.calibration,
            selective: p.selective,
            risk: p.risk,
            compliance: p.compliance,
            scorecard: p.scorecard,
            regulatory_tags: p.regulatory_tags,
            recommendations: p.recommendations,
            warnings: p.warnings,
        }
    }
}

impl EvaluationResult {
    pub fn ruleset_version(&self) -> &str {
        &self.ruleset_version
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_bins(&self) -> usize {
        self.calibration.n_bins
    }

    pub fn u_precision(&self) -> f64 {
        self.unknown_detection.precision
    }

    pub fn u_recall(&self) -> f64 {
        self.unknown_detection.recall
    }

    pub fn u_f1(&self) -> f64 {
        self.unknown_detection.f1
    }

    pub fn unknown_detection(&self) -> &ClassMetrics {
        &self.unknown_detection
    }

    pub fn per_class(&self) -> &[ClassMetrics] {
        &self.per_class
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn macro_f1(&self) -> f64 {
        self.macro_f1
    }

    pub fn uncertainty_recall(&self) -> f64 {
        self.uncertainty_recall
    }

    pub fn ece(&self) -> f64 {
        self.calibration.ece
    }

    pub fn brier(&self) -> f64 {
        self.calibration.brier
    }

    pub fn overconfidence_rate(&self) -> f64 {
        self.calibration.overconfidence_rate
    }

    pub fn calibration(&self) -> &CalibrationReport {
        &self.calibration
    }

    pub fn selective(&self) -> &SelectiveReport {
        &self.selective
    }

    pub fn risk_score(&self) -> f64 {
        self.risk.score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk.level
    }

    pub fn risk(&self) -> &RiskAssessment {
        &self.risk
    }

    pub fn compliance_level(&self) -> ComplianceLevel {
        self.compliance
    }

    pub fn scorecard(&self) -> &ComplianceScorecard {
        &self.scorecard
    }

    pub fn regulatory_tags(&self) -> &[String] {
        &self.regulatory_tags
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn warnings(&self) -> &[SampleWarning] {
        &self.warnings
    }

    /// Degenerate or small sample: read the metrics with care.
    pub fn is_low_confidence(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Flat key-value export of the headline fields.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };
        put("ruleset_version", json!(self.ruleset_version));
        put("domain", json!(self.domain.as_str()));
        put("n_samples", json!(self.n_samples));
        put("n_bins", json!(self.calibration.n_bins));
        put("u_precision", json!(self.u_precision()));
        put("u_recall", json!(self.u_recall()));
        put("u_f1", json!(self.u_f1()));
        put("accuracy", json!(self.accuracy));
        put("macro_f1", json!(self.macro_f1));
        put("ece", json!(self.calibration.ece));
        put("mce", json!(self.calibration.mce));
        put("brier_score", json!(self.calibration.brier));
        put("overconfidence_rate", json!(self.calibration.overconfidence_rate));
        put("uncertainty_recall", json!(self.uncertainty_recall));
        put("uncertainty_threshold", json!(self.uncertainty_threshold));
        put("auroc_unknown", json!(self.selective.auroc_unknown));
        put("aurc", json!(self.selective.aurc));
        put("risk_at_80_coverage", json!(self.selective.risk_at_80_coverage));
        put("risk_score", json!(self.risk.score));
        put("risk_level", json!(self.risk.level.as_str()));
        put("compliance_level", json!(self.compliance.as_str()));
        put("compliance_score", json!(self.scorecard.score));
        put("compliance_grade", json!(self.scorecard.grade));
        put("compliance_status", json!(self.scorecard.status.to_string()));
        put("regulatory_tags", json!(self.regulatory_tags));
        put("low_confidence", json!(self.is_low_confidence()));
        put(
            "warnings",
            json!(self.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>()),
        );
        map
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "[{}] n={} | U-Recall {:.4} U-Precision {:.4} U-F1 {:.4} | ECE {:.4} ({} bins) Brier {:.4} | Risk {} ({:.1}/100, {}) | Compliance {}",
            self.ruleset_version,
            self.n_samples,
            self.u_recall(),
            self.u_precision(),
            self.u_f1(),
            self.calibration.ece,
            self.calibration.n_bins,
            self.calibration.brier,
            self.risk.level,
            self.risk.score,
            self.domain,
            self.compliance,
        );
        if self.is_low_confidence() {
            line.push_str(" | LOW CONFIDENCE");
        }
        line
    }

    /// Fixed-format citation string for compliance documentation.
    pub fn citation(&self) -> String {
        format!(
            "ONTO Epistemic Risk Standard, ruleset {}: compliance level {}, risk level {} \
             (score {:.1}/100, domain {}); U-Recall {:.4}, ECE {:.4} over {} equal-width bins, \
             n={}. Assessed against: {}.",
            self.ruleset_version,
            self.compliance,
            self.risk.level,
            self.risk.score,
            self.domain,
            self.u_recall(),
            self.calibration.ece,
            self.calibration.n_bins,
            self.n_samples,
            if self.regulatory_tags.is_empty() {
                "no regulatory frameworks".to_string()
            } else {
                self.regulatory_tags.join("; ")
            },
        )
    }
}
