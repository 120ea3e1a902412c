// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Score Types
// ─────────────────────────────────────────────────────────────────────
//! Plain data produced by the scoring and metric stages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Label;
use crate::ruleset::{Domain, RiskLevel};
use crate::vocabulary::Category;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Clamp to the unit interval.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    clamp_score(value, 0.0, 1.0)
}

/// Per-category occurrence counts for one scanned text.
///
/// All six categories are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub counts: BTreeMap<Category, u32>,
    /// Whitespace-delimited tokens in the scanned text.
    pub word_count: u32,
}

impl Default for CategoryCount {
    fn default() -> Self {
        Self {
            counts: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            word_count: 0,
        }
    }
}

impl CategoryCount {
    pub fn get(&self, category: Category) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn set(&mut self, category: Category, count: u32) {
        self.counts.insert(category, count);
    }

    /// `QD + SS + UM + CP - VQ`. Confidence statements are excluded.
    pub fn composite(&self) -> i64 {
        i64::from(self.get(Category::Quantification))
            + i64::from(self.get(Category::Sources))
            + i64::from(self.get(Category::Uncertainty))
            + i64::from(self.get(Category::Counterarguments))
            - i64::from(self.get(Category::VagueQualifiers))
    }

    /// Occurrences per hundred words; 0.0 for empty text.
    pub fn per_hundred_words(&self, category: Category) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        f64::from(self.get(category)) * 100.0 / f64::from(self.word_count)
    }
}

/// Result of scoring one free-text response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextScore {
    pub counts: CategoryCount,
    pub composite: i64,
    /// Reported separately from the composite.
    pub confidence_statements: u32,
    pub ruleset_version: String,
}

/// One equal-width confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// Mean stated confidence; 0.0 when the bin is empty.
    pub mean_confidence: f64,
    /// Fraction correct; 0.0 when the bin is empty.
    pub accuracy: f64,
}

impl CalibrationBin {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn gap(&self) -> f64 {
        (self.accuracy - self.mean_confidence).abs()
    }

    pub fn is_overconfident(&self) -> bool {
        !self.is_empty() && self.mean_confidence > self.accuracy
    }
}

/// Binned calibration error plus proper scoring-rule loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub n_bins: usize,
    pub bins: Vec<CalibrationBin>,
    pub ece: f64,
    /// Largest per-bin gap.
    pub mce: f64,
    pub brier: f64,
    pub overconfidence_rate: f64,
    pub mean_confidence: f64,
    pub n_samples: usize,
}

/// One-vs-rest detection metrics for a single label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassMetrics {
    /// Ground-truth items carrying this label.
    pub fn support(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn predicted(&self) -> usize {
        self.true_positives + self.false_positives
    }
}

/// One point of the risk-coverage curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePoint {
    pub coverage: f64,
    pub risk: f64,
}

/// Behaviour when the model abstains below a confidence threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstentionStats {
    pub threshold: f64,
    pub abstention_rate: f64,
    pub answered_accuracy: f64,
    pub abstained: usize,
    pub answered: usize,
    /// Ground-truth label counts of the abstained items.
    pub abstained_by_label: BTreeMap<Label, usize>,
    /// Share of abstentions whose ground truth is UNKNOWN.
    pub unknown_abstention_rate: f64,
}

/// Selective-prediction metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectiveReport {
    pub auroc_unknown: f64,
    pub aurc: f64,
    pub risk_at_80_coverage: f64,
    pub curve: Vec<CoveragePoint>,
    pub abstention: Vec<AbstentionStats>,
}

/// Bounded risk score and its band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub domain: Domain,
    pub domain_modifier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScorecardStatus {
    Pass,
    Conditional,
    Fail,
}

impl fmt::Display for ScorecardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScorecardStatus::Pass => "PASS",
            ScorecardStatus::Conditional => "CONDITIONAL",
            ScorecardStatus::Fail => "FAIL",
        })
    }
}

/// Single-number executive summary of compliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScorecard {
    /// 0–100.
    pub score: f64,
    pub grade: String,
    pub status: ScorecardStatus,
}
