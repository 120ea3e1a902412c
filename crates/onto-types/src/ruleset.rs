// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Versioned Threshold Tables
// ─────────────────────────────────────────────────────────────────────
//! Domain modifiers, risk bands, compliance tiers and the pattern
//! vocabulary, versioned together under a single tag.
//!
//! Changing any threshold changes classification without changing the
//! underlying metrics, so every `EvaluationResult` records
//! [`Ruleset::version`]. Bump the tag whenever a table changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OntoError, OntoResult};
use crate::vocabulary::Vocabulary;

/// Version tag of the built-in tables.
pub const DEFAULT_RULESET_VERSION: &str = "onto-2026.1";

/// Deployment domain of the evaluated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    General,
    Code,
    Financial,
    Legal,
    Medical,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::General,
        Domain::Code,
        Domain::Financial,
        Domain::Legal,
        Domain::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::General => "general",
            Domain::Code => "code",
            Domain::Financial => "financial",
            Domain::Legal => "legal",
            Domain::Medical => "medical",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = OntoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Domain::General),
            "code" => Ok(Domain::Code),
            "financial" | "finance" => Ok(Domain::Financial),
            "legal" => Ok(Domain::Legal),
            "medical" | "healthcare" => Ok(Domain::Medical),
            other => Err(OntoError::Config(format!(
                "unknown domain {other:?} (expected general, code, financial, legal or medical)"
            ))),
        }
    }
}

/// Discrete band of the 0–100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compliance tier. Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    None,
    Basic,
    Standard,
    Advanced,
}

impl ComplianceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceLevel::None => "NONE",
            ComplianceLevel::Basic => "BASIC",
            ComplianceLevel::Standard => "STANDARD",
            ComplianceLevel::Advanced => "ADVANCED",
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-domain risk modifier and applicable regulatory frameworks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub domain: Domain,
    pub risk_modifier: f64,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

/// `risk = ece * ece_weight + (100 - u_recall * 100) * recall_weight + modifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub ece_weight: f64,
    pub recall_weight: f64,
}

/// Upper-inclusive band: a score `s` belongs to the first band (in
/// ascending order) with `s <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub level: RiskLevel,
    pub upper: f64,
}

/// Joint thresholds for one compliance tier; both are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceTier {
    pub level: ComplianceLevel,
    pub min_u_recall: f64,
    pub max_ece: f64,
}

/// Weights and cut-offs for the single-number compliance scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardTable {
    pub recall_weight: f64,
    pub calibration_weight: f64,
    pub accuracy_weight: f64,
    /// `(grade, minimum score)`, strongest first.
    pub grades: Vec<(String, f64)>,
    pub pass_score: f64,
    pub conditional_score: f64,
}

/// Thresholds that trigger advisory recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryThresholds {
    pub min_u_recall: f64,
    pub max_ece: f64,
    pub min_contradiction_f1: f64,
}

/// Every classification table, versioned as one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub version: String,
    pub domains: Vec<DomainProfile>,
    /// Frameworks tagged regardless of domain.
    pub baseline_frameworks: Vec<String>,
    pub risk_weights: RiskWeights,
    /// Ascending by `upper`; the last band must reach 100.
    pub risk_bands: Vec<RiskBand>,
    /// Strongest tier first.
    pub compliance_tiers: Vec<ComplianceTier>,
    pub scorecard: ScorecardTable,
    pub advisory: AdvisoryThresholds,
    pub vocabulary: Vocabulary,
}

impl Default for Ruleset {
    fn default() -> Self {
        fn profile(domain: Domain, risk_modifier: f64, frameworks: &[&str]) -> DomainProfile {
            DomainProfile {
                domain,
                risk_modifier,
                frameworks: frameworks.iter().map(|f| f.to_string()).collect(),
            }
        }

        Self {
            version: DEFAULT_RULESET_VERSION.to_string(),
            domains: vec![
                profile(Domain::General, 0.0, &[]),
                profile(Domain::Code, 5.0, &[]),
                profile(
                    Domain::Financial,
                    10.0,
                    &["SEC AI Disclosure Rules", "SR 11-7 Model Risk Management"],
                ),
                profile(Domain::Legal, 10.0, &["ABA Ethics Guidelines"]),
                profile(Domain::Medical, 15.0, &["FDA AI/ML Guidelines", "HIPAA"]),
            ],
            baseline_frameworks: vec![
                "EU AI Act (High-Risk AI)".to_string(),
                "NIST AI RMF".to_string(),
            ],
            risk_weights: RiskWeights {
                ece_weight: 200.0,
                recall_weight: 0.5,
            },
            risk_bands: vec![
                RiskBand { level: RiskLevel::Low, upper: 25.0 },
                RiskBand { level: RiskLevel::Moderate, upper: 50.0 },
                RiskBand { level: RiskLevel::High, upper: 75.0 },
                RiskBand { level: RiskLevel::Critical, upper: 100.0 },
            ],
            compliance_tiers: vec![
                ComplianceTier {
                    level: ComplianceLevel::Advanced,
                    min_u_recall: 0.70,
                    max_ece: 0.10,
                },
                ComplianceTier {
                    level: ComplianceLevel::Standard,
                    min_u_recall: 0.50,
                    max_ece: 0.15,
                },
                ComplianceTier {
                    level: ComplianceLevel::Basic,
                    min_u_recall: 0.30,
                    max_ece: 0.20,
                },
            ],
            scorecard: ScorecardTable {
                recall_weight: 0.40,
                calibration_weight: 0.35,
                accuracy_weight: 0.25,
                grades: vec![
                    ("A".to_string(), 85.0),
                    ("B".to_string(), 70.0),
                    ("C".to_string(), 55.0),
                    ("D".to_string(), 40.0),
                ],
                pass_score: 70.0,
                conditional_score: 50.0,
            },
            advisory: AdvisoryThresholds {
                min_u_recall: 0.30,
                max_ece: 0.20,
                min_contradiction_f1: 0.10,
            },
            vocabulary: Vocabulary::default(),
        }
    }
}

impl Ruleset {
    pub fn profile(&self, domain: Domain) -> Option<&DomainProfile> {
        self.domains.iter().find(|p| p.domain == domain)
    }

    /// Validate table consistency.
    pub fn validate(&self) -> OntoResult<()> {
        if self.version.trim().is_empty() {
            return Err(OntoError::Config("ruleset version must not be empty".into()));
        }

        for domain in Domain::ALL {
            let count = self.domains.iter().filter(|p| p.domain == domain).count();
            if count != 1 {
                return Err(OntoError::Config(format!(
                    "domain {domain} must appear exactly once in the ruleset, found {count}"
                )));
            }
        }
        if let Some(p) = self.domains.iter().find(|p| !p.risk_modifier.is_finite()) {
            return Err(OntoError::Config(format!(
                "risk modifier for {} must be finite",
                p.domain
            )));
        }

        let w = &self.risk_weights;
        if !(w.ece_weight.is_finite() && w.ece_weight >= 0.0)
            || !(w.recall_weight.is_finite() && w.recall_weight >= 0.0)
        {
            return Err(OntoError::Config(format!(
                "risk weights must be finite and >= 0, got ece={} recall={}",
                w.ece_weight, w.recall_weight
            )));
        }

        if self.risk_bands.is_empty() {
            return Err(OntoError::Config("risk_bands must not be empty".into()));
        }
        if let Some(band) = self.risk_bands.iter().find(|b| !b.upper.is_finite()) {
            return Err(OntoError::Config(format!(
                "risk band {} upper bound must be finite, got {}",
                band.level, band.upper
            )));
        }
        for pair in self.risk_bands.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(OntoError::Config(format!(
                    "risk_bands must be strictly ascending, got {} after {}",
                    pair[1].upper, pair[0].upper
                )));
            }
            // Also rules out a level appearing twice.
            if pair[1].level <= pair[0].level {
                return Err(OntoError::Config(format!(
                    "risk band levels must ascend from LOW to CRITICAL, got {} after {}",
                    pair[1].level, pair[0].level
                )));
            }
        }
        let last = &self.risk_bands[self.risk_bands.len() - 1];
        if last.upper < 100.0 {
            return Err(OntoError::Config(format!(
                "last risk band must reach 100, got {}",
                last.upper
            )));
        }

        for tier in &self.compliance_tiers {
            if tier.level == ComplianceLevel::None {
                return Err(OntoError::Config(
                    "NONE is the fallback level and cannot be a tier".into(),
                ));
            }
            if !(0.0..=1.0).contains(&tier.min_u_recall) || !(0.0..=1.0).contains(&tier.max_ece) {
                return Err(OntoError::Config(format!(
                    "{} thresholds must be in [0, 1], got min_u_recall={} max_ece={}",
                    tier.level, tier.min_u_recall, tier.max_ece
                )));
            }
        }
        for pair in self.compliance_tiers.windows(2) {
            let (stronger, weaker) = (&pair[0], &pair[1]);
            if stronger.level <= weaker.level
                || stronger.min_u_recall < weaker.min_u_recall
                || stronger.max_ece > weaker.max_ece
            {
                return Err(OntoError::Config(format!(
                    "compliance tier {} must be listed before and be at least as strict as {}",
                    stronger.level, weaker.level
                )));
            }
        }

        let s = &self.scorecard;
        let weight_sum = s.recall_weight + s.calibration_weight + s.accuracy_weight;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(OntoError::Config(format!(
                "scorecard weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if let Some((grade, min)) = s
            .grades
            .iter()
            .find(|(grade, min)| grade.trim().is_empty() || !min.is_finite())
        {
            return Err(OntoError::Config(format!(
                "scorecard grade {grade:?} needs a name and a finite minimum, got {min}"
            )));
        }
        for pair in s.grades.windows(2) {
            let ((stronger, hi), (weaker, lo)) = (&pair[0], &pair[1]);
            if lo >= hi {
                return Err(OntoError::Config(format!(
                    "scorecard grades must be listed strongest first with descending \
                     minimums, got {weaker} ({lo}) after {stronger} ({hi})"
                )));
            }
        }
        if !s.pass_score.is_finite() || !s.conditional_score.is_finite() {
            return Err(OntoError::Config(format!(
                "scorecard pass_score and conditional_score must be finite, got {} and {}",
                s.pass_score, s.conditional_score
            )));
        }
        if s.conditional_score > s.pass_score {
            return Err(OntoError::Config(format!(
                "scorecard conditional_score ({}) must not exceed pass_score ({})",
                s.conditional_score, s.pass_score
            )));
        }

        self.vocabulary.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset_is_valid() {
        assert!(Ruleset::default().validate().is_ok());
    }

    #[test]
    fn test_default_domain_modifiers() {
        let rs = Ruleset::default();
        let modifier = |d| rs.profile(d).unwrap().risk_modifier;
        assert_eq!(modifier(Domain::Medical), 15.0);
        assert_eq!(modifier(Domain::Legal), 10.0);
        assert_eq!(modifier(Domain::Financial), 10.0);
        assert_eq!(modifier(Domain::Code), 5.0);
        assert_eq!(modifier(Domain::General), 0.0);
    }

    #[test]
    fn test_domain_parse_aliases() {
        assert_eq!("Healthcare".parse::<Domain>().unwrap(), Domain::Medical);
        assert_eq!("finance".parse::<Domain>().unwrap(), Domain::Financial);
        assert!("astrology".parse::<Domain>().is_err());
    }

    #[test]
    fn test_duplicate_domain_rejected() {
        let mut rs = Ruleset::default();
        rs.domains.push(DomainProfile {
            domain: Domain::Code,
            risk_modifier: 1.0,
            frameworks: vec![],
        });
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_descending_bands_rejected() {
        let mut rs = Ruleset::default();
        rs.risk_bands.swap(0, 1);
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_bands_must_reach_100() {
        let mut rs = Ruleset::default();
        rs.risk_bands.pop();
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_tier_order_enforced() {
        let mut rs = Ruleset::default();
        rs.compliance_tiers.reverse();
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_looser_stronger_tier_rejected() {
        let mut rs = Ruleset::default();
        rs.compliance_tiers[0].max_ece = 0.5;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_band_levels_must_ascend() {
        let mut rs = Ruleset::default();
        rs.risk_bands[0].level = RiskLevel::Critical;
        let err = rs.validate().unwrap_err();
        assert!(err.to_string().contains("LOW to CRITICAL"));
    }

    #[test]
    fn test_duplicate_band_level_rejected() {
        let mut rs = Ruleset::default();
        rs.risk_bands[1].level = RiskLevel::Low;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_nan_band_upper_rejected() {
        let mut rs = Ruleset::default();
        rs.risk_bands[1].upper = f64::NAN;
        let err = rs.validate().unwrap_err();
        assert!(err.to_string().contains("finite"));

        let mut rs = Ruleset::default();
        rs.risk_bands[3].upper = f64::INFINITY;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_grades_must_descend() {
        let mut rs = Ruleset::default();
        rs.scorecard.grades = vec![("D".into(), 40.0), ("A".into(), 85.0)];
        let err = rs.validate().unwrap_err();
        assert!(err.to_string().contains("strongest first"));

        let mut rs = Ruleset::default();
        rs.scorecard.grades[2].1 = 70.0;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_nan_grade_minimum_rejected() {
        let mut rs = Ruleset::default();
        rs.scorecard.grades[0].1 = f64::NAN;
        assert!(rs.validate().is_err());

        let mut rs = Ruleset::default();
        rs.scorecard.grades[1].0 = " ".into();
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_nan_pass_score_rejected() {
        let mut rs = Ruleset::default();
        rs.scorecard.pass_score = f64::NAN;
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let rs: Ruleset = serde_json::from_str(r#"{"version": "custom-1"}"#).unwrap();
        assert_eq!(rs.version, "custom-1");
        assert_eq!(rs.risk_bands.len(), 4);
        assert!(rs.validate().is_ok());
    }

    #[test]
    fn test_level_ordering() {
        assert!(ComplianceLevel::Advanced > ComplianceLevel::Standard);
        assert!(ComplianceLevel::Basic > ComplianceLevel::None);
        assert!(RiskLevel::Critical > RiskLevel::High);
    }
}
