// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Pattern Vocabulary
// ─────────────────────────────────────────────────────────────────────
//! Category → match-pattern table used by the pattern scorer.
//!
//! The vocabulary is data, not code: it serializes to JSON, is carried
//! inside the versioned [`Ruleset`](crate::ruleset::Ruleset), and can be
//! diffed between ruleset versions independently of the scoring logic.
//!
//! Two kinds of entry exist:
//! - [`MatchKind::Terms`]: literal words/phrases, matched case-insensitively
//!   on word boundaries wherever the term starts or ends with a word
//!   character (whitespace inside a phrase matches any run of whitespace).
//! - [`MatchKind::Regex`]: raw regular expressions, matched
//!   case-insensitively. A regex that matches the empty string is rejected
//!   when the scorer is built.
//!
//! Default patterns spell digits as `[0-9]`: numbers are ASCII throughout.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OntoError, OntoResult};

/// The six fixed scoring categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Numeric tokens (decimals, percentages).
    #[serde(rename = "QD")]
    Quantification,
    /// Citation-like constructs.
    #[serde(rename = "SS")]
    Sources,
    /// Hedging / unknown-signalling terms.
    #[serde(rename = "UM")]
    Uncertainty,
    /// Contrast and limitation connectives.
    #[serde(rename = "CP")]
    Counterarguments,
    /// Intensity words with no adjacent number.
    #[serde(rename = "VQ")]
    VagueQualifiers,
    /// Explicit probability statements in [0, 1].
    #[serde(rename = "CONF")]
    ConfidenceStatements,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Quantification,
        Category::Sources,
        Category::Uncertainty,
        Category::Counterarguments,
        Category::VagueQualifiers,
        Category::ConfidenceStatements,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Quantification => "QD",
            Category::Sources => "SS",
            Category::Uncertainty => "UM",
            Category::Counterarguments => "CP",
            Category::VagueQualifiers => "VQ",
            Category::ConfidenceStatements => "CONF",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Quantification => "quantification",
            Category::Sources => "sources",
            Category::Uncertainty => "uncertainty markers",
            Category::Counterarguments => "counterarguments",
            Category::VagueQualifiers => "vague qualifiers",
            Category::ConfidenceStatements => "confidence statements",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How the patterns of a category are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Terms,
    Regex,
}

/// Match patterns for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub kind: MatchKind,
    pub patterns: Vec<String>,
}

impl CategoryRule {
    fn terms(patterns: &[&str]) -> Self {
        Self {
            kind: MatchKind::Terms,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn regex(patterns: &[&str]) -> Self {
        Self {
            kind: MatchKind::Regex,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

const QUANTIFICATION_PATTERNS: &[&str] = &[r"[0-9]+\.?[0-9]*%?"];

const SOURCE_PATTERNS: &[&str] = &[
    // Smith et al. (2020) / Smith et al., 2020
    r"\b[a-z][a-z'\-]+\s+et\s+al\.?,?\s*\(?[0-9]{4}\)?",
    // (Smith, 2020) / (Smith and Jones 2019a)
    r"\([a-z][a-z'\-]+(?:\s+(?:and|&)\s+[a-z][a-z'\-]+)?,?\s+[0-9]{4}[a-z]?\)",
    // doi:10.1000/xyz or bare 10.1000/xyz
    r"(?:\bdoi:\s*)?\b10\.[0-9]{4,9}/[-._;()/:a-z0-9]+",
    r"\baccording\s+to\s+(?:a|an|the)?\s*(?:recent\s+)?(?:study|studies|survey|report|meta-analysis|trial|review)\b",
    r"\b(?:study|survey|trial|meta-analysis)\s+(?:by|from)\s+[a-z]+",
    r"\bpublished\s+in\s+(?:the\s+)?[a-z]+",
];

const UNCERTAINTY_TERMS: &[&str] = &[
    "uncertain",
    "uncertainty",
    "unknown",
    "unclear",
    "not known",
    "not certain",
    "may",
    "might",
    "could be",
    "possibly",
    "perhaps",
    "probably",
    "likely",
    "unlikely",
    "approximately",
    "roughly",
    "estimated",
    "i don't know",
    "we don't know",
    "no consensus",
    "insufficient data",
    "insufficient evidence",
    "limited evidence",
    "cannot be determined",
    "open question",
    "unresolved",
    "speculative",
];

const COUNTERARGUMENT_TERMS: &[&str] = &[
    "however",
    "but",
    "although",
    "though",
    "nevertheless",
    "nonetheless",
    "on the other hand",
    "conversely",
    "whereas",
    "risk",
    "risks",
    "challenge",
    "challenges",
    "limitation",
    "limitations",
    "drawback",
    "drawbacks",
    "caveat",
    "critics",
    "counterargument",
    "downside",
    "trade-off",
];

const VAGUE_QUALIFIER_TERMS: &[&str] = &[
    "moderate",
    "moderately",
    "significant",
    "significantly",
    "substantial",
    "substantially",
    "considerable",
    "considerably",
    "many",
    "several",
    "numerous",
    "various",
    "often",
    "frequently",
    "largely",
    "generally",
    "relatively",
    "fairly",
    "very",
    "highly",
    "extremely",
    "a lot",
];

const CONFIDENCE_PATTERNS: &[&str] = &[
    // confidence: 0.85 / probability = .7 / certainty level: 1
    r"\b(?:confidence|certainty|probability|credence)(?:\s+(?:level|score))?\s*[:=]\s*[0-9]*\.?[0-9]+",
    // 0.85 probability / 0.9 confidence
    r"\b[0-9]*\.?[0-9]+\s+(?:confidence|probability)\b",
];

/// Category → rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub categories: BTreeMap<Category, CategoryRule>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            Category::Quantification,
            CategoryRule::regex(QUANTIFICATION_PATTERNS),
        );
        categories.insert(Category::Sources, CategoryRule::regex(SOURCE_PATTERNS));
        categories.insert(Category::Uncertainty, CategoryRule::terms(UNCERTAINTY_TERMS));
        categories.insert(
            Category::Counterarguments,
            CategoryRule::terms(COUNTERARGUMENT_TERMS),
        );
        categories.insert(
            Category::VagueQualifiers,
            CategoryRule::terms(VAGUE_QUALIFIER_TERMS),
        );
        categories.insert(
            Category::ConfidenceStatements,
            CategoryRule::regex(CONFIDENCE_PATTERNS),
        );
        Self { categories }
    }
}

impl Vocabulary {
    pub fn rule(&self, category: Category) -> Option<&CategoryRule> {
        self.categories.get(&category)
    }

    /// Every category must be present with at least one non-blank pattern.
    pub fn validate(&self) -> OntoResult<()> {
        for category in Category::ALL {
            let rule = self.categories.get(&category).ok_or_else(|| {
                OntoError::Config(format!("vocabulary is missing category {category}"))
            })?;
            if rule.patterns.is_empty() {
                return Err(OntoError::Config(format!(
                    "vocabulary category {category} has no patterns"
                )));
            }
            if rule.patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(OntoError::Config(format!(
                    "vocabulary category {category} contains a blank pattern"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_is_complete() {
        let vocab = Vocabulary::default();
        assert!(vocab.validate().is_ok());
        assert_eq!(vocab.categories.len(), Category::ALL.len());
    }

    #[test]
    fn test_missing_category_rejected() {
        let mut vocab = Vocabulary::default();
        vocab.categories.remove(&Category::Sources);
        let err = vocab.validate().unwrap_err();
        assert!(err.to_string().contains("SS"));
    }

    #[test]
    fn test_blank_pattern_rejected() {
        let mut vocab = Vocabulary::default();
        vocab
            .categories
            .get_mut(&Category::Uncertainty)
            .unwrap()
            .patterns
            .push("   ".into());
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn test_category_codes_serialize_as_map_keys() {
        let json = serde_json::to_value(Vocabulary::default()).unwrap();
        let keys: Vec<&String> = json["categories"].as_object().unwrap().keys().collect();
        for code in ["QD", "SS", "UM", "CP", "VQ", "CONF"] {
            assert!(keys.iter().any(|k| k.as_str() == code), "missing {code}");
        }
    }

    #[test]
    fn test_vocabulary_json_round_trip() {
        let vocab = Vocabulary::default();
        let json = serde_json::to_string(&vocab).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(vocab, back);
    }
}
