// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Pattern Scorer
// ─────────────────────────────────────────────────────────────────────
//! Lexical surface scan of one model response.
//!
//! Each category's patterns are compiled into a single case-insensitive
//! alternation, so matches are non-overlapping within a category while
//! different categories may match overlapping spans. This is a
//! first-order approximation of epistemic form, not an NLP pipeline:
//! there is no semantic disambiguation.
//!
//! Zero-width matches never count. Two categories apply a post-filter to
//! each raw match:
//! - `VQ` drops matches with a number immediately before or after them
//!   ("significant 12% rise" is quantified, not vague).
//! - `CONF` keeps only matches whose stated value lies in [0, 1].

use regex::Regex;

use onto_types::vocabulary::{Category, CategoryRule, MatchKind, Vocabulary};
use onto_types::{CategoryCount, OntoError, OntoResult, TextScore};

/// Trailing numeric literal of a confidence statement.
const CONF_VALUE_PATTERN: &str = r"[0-9]*\.?[0-9]+";

/// Compiled pattern scorer.
///
/// Stateless after construction and `Send + Sync`: one instance can
/// score texts from any number of threads.
#[derive(Debug, Clone)]
pub struct PatternScorer {
    matchers: Vec<(Category, Regex)>,
    conf_value: Regex,
    ruleset_version: String,
}

impl PatternScorer {
    /// Compile every category of `vocabulary`.
    pub fn new(vocabulary: &Vocabulary, ruleset_version: impl Into<String>) -> OntoResult<Self> {
        vocabulary.validate()?;

        let mut matchers = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let rule = vocabulary
                .rule(category)
                .ok_or_else(|| OntoError::Config(format!("vocabulary is missing {category}")))?;
            matchers.push((category, compile_rule(category, rule)?));
        }

        let conf_value = Regex::new(CONF_VALUE_PATTERN).map_err(|e| OntoError::Pattern {
            category: Category::ConfidenceStatements.code().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            matchers,
            conf_value,
            ruleset_version: ruleset_version.into(),
        })
    }

    /// Count occurrences of every category in `text`.
    ///
    /// Empty text yields all-zero counts.
    pub fn scan(&self, text: &str) -> CategoryCount {
        let mut counts = CategoryCount {
            word_count: saturating_u32(text.split_whitespace().count()),
            ..Default::default()
        };

        for (category, regex) in &self.matchers {
            let matches = regex.find_iter(text).filter(|m| !m.is_empty());
            let n = match category {
                Category::VagueQualifiers => matches
                    .filter(|m| !has_adjacent_number(text, m.start(), m.end()))
                    .count(),
                Category::ConfidenceStatements => matches
                    .filter(|m| self.is_unit_probability(m.as_str()))
                    .count(),
                _ => matches.count(),
            };
            counts.set(*category, saturating_u32(n));
        }

        counts
    }

    /// Scan and fold into the composite score.
    pub fn score(&self, text: &str) -> TextScore {
        let counts = self.scan(text);
        let composite = counts.composite();
        let confidence_statements = counts.get(Category::ConfidenceStatements);
        log::debug!(
            "scored text: words={} composite={composite} conf={confidence_statements}",
            counts.word_count
        );
        TextScore {
            counts,
            composite,
            confidence_statements,
            ruleset_version: self.ruleset_version.clone(),
        }
    }

    pub fn ruleset_version(&self) -> &str {
        &self.ruleset_version
    }

    fn is_unit_probability(&self, statement: &str) -> bool {
        self.conf_value
            .find_iter(statement)
            .last()
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .is_some_and(|v| (0.0..=1.0).contains(&v))
    }
}

/// Build one case-insensitive alternation for a category.
fn compile_rule(category: Category, rule: &CategoryRule) -> OntoResult<Regex> {
    let body = match rule.kind {
        MatchKind::Terms => {
            // Longest phrase first so "on the other hand" wins over shorter
            // alternatives sharing a prefix.
            let mut terms: Vec<&str> = rule.patterns.iter().map(|t| t.trim()).collect();
            terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            terms.dedup();
            let alternatives: Vec<String> = terms.iter().map(|t| term_pattern(t)).collect();
            format!("(?:{})", alternatives.join("|"))
        }
        MatchKind::Regex => rule
            .patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|"),
    };

    let regex = Regex::new(&format!("(?i){body}")).map_err(|e| OntoError::Pattern {
        category: category.code().to_string(),
        reason: e.to_string(),
    })?;
    if regex.is_match("") {
        return Err(OntoError::Pattern {
            category: category.code().to_string(),
            reason: "pattern matches the empty string".into(),
        });
    }
    Ok(regex)
}

/// Escape a literal term; inner whitespace matches any whitespace run.
///
/// A word boundary is required only on a side where the term begins or
/// ends with a word character, so "n.a." and "(?)" still match.
fn term_pattern(term: &str) -> String {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let boundary = |c: Option<char>| if c.is_some_and(is_word_char) { r"\b" } else { "" };
    format!(
        "{}{body}{}",
        boundary(term.chars().next()),
        boundary(term.chars().next_back())
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the token right before `start` ends with a digit or `%`, or
/// the token right after `end` starts with a digit.
fn has_adjacent_number(text: &str, start: usize, end: usize) -> bool {
    let next = text[end..].trim_start().chars().next();
    if next.is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    let prev = text[..start].trim_end().chars().next_back();
    prev.is_some_and(|c| c.is_ascii_digit() || c == '%')
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
