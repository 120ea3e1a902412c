// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Selective Prediction Metrics
// ─────────────────────────────────────────────────────────────────────
//! How well confidence ranks the model's own errors: AUROC for UNKNOWN
//! detection, the risk-coverage curve and abstention behaviour.

use std::collections::BTreeMap;

use onto_types::score::{clamp_unit, AbstentionStats, CoveragePoint, SelectiveReport};
use onto_types::Label;

use crate::join::JoinedSample;

/// Coverage level whose risk is reported as the headline figure.
const HEADLINE_COVERAGE: f64 = 0.8;

/// ROC area for separating UNKNOWN ground truth from the rest.
///
/// An item scores its confidence when predicted UNKNOWN and
/// `1 - confidence` otherwise. Ties keep input order. Returns 0.5 when
/// either class is absent.
pub fn auroc_unknown(samples: &[JoinedSample<'_>]) -> f64 {
    let n_pos = samples.iter().filter(|s| s.truth == Label::Unknown).count();
    let n_neg = samples.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut scored: Vec<(f64, bool)> = samples
        .iter()
        .map(|s| {
            let score = if s.predicted == Label::Unknown {
                s.confidence
            } else {
                1.0 - s.confidence
            };
            (score, s.truth == Label::Unknown)
        })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let (mut tp, mut fp) = (0usize, 0usize);
    let (mut tpr_prev, mut fpr_prev) = (0.0, 0.0);
    let mut area = 0.0;
    for (_, positive) in scored {
        if positive {
            tp += 1;
        } else {
            fp += 1;
        }
        let tpr = tp as f64 / n_pos as f64;
        let fpr = fp as f64 / n_neg as f64;
        area += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;
        tpr_prev = tpr;
        fpr_prev = fpr;
    }
    clamp_unit(area)
}

/// Error rate of the most confident items at `points` coverage levels.
///
/// Level `i` (1-based) covers `i / points` of the set, keeping the
/// `max(1, floor(n * coverage))` most confident items. Empty input
/// yields an empty curve.
pub fn risk_coverage(samples: &[JoinedSample<'_>], points: usize) -> Vec<CoveragePoint> {
    if samples.is_empty() || points == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(f64, bool)> = samples
        .iter()
        .map(|s| (s.confidence, s.is_correct()))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    // errors_prefix[k] = errors among the k most confident items
    let mut errors_prefix = Vec::with_capacity(ranked.len() + 1);
    errors_prefix.push(0usize);
    for (_, ok) in &ranked {
        let last = errors_prefix[errors_prefix.len() - 1];
        errors_prefix.push(last + usize::from(!ok));
    }

    let n = ranked.len();
    (1..=points)
        .map(|i| {
            let coverage = i as f64 / points as f64;
            let covered = ((n as f64 * coverage).floor() as usize).clamp(1, n);
            CoveragePoint {
                coverage,
                risk: errors_prefix[covered] as f64 / covered as f64,
            }
        })
        .collect()
}

/// Trapezoidal area under the risk-coverage curve. Lower is better.
pub fn aurc(curve: &[CoveragePoint]) -> f64 {
    curve
        .windows(2)
        .map(|w| (w[1].coverage - w[0].coverage) * (w[0].risk + w[1].risk) / 2.0)
        .sum()
}

/// Risk at the point with index `floor(0.8 * len) - 1`, or the last point
/// when that index would be negative. 0.0 for an empty curve.
pub fn risk_at_80_coverage(curve: &[CoveragePoint]) -> f64 {
    if curve.is_empty() {
        return 0.0;
    }
    let idx = ((HEADLINE_COVERAGE * curve.len() as f64).floor() as usize)
        .checked_sub(1)
        .unwrap_or(curve.len() - 1);
    curve[idx].risk
}

/// Treat every item with confidence strictly below `threshold` as an
/// abstention.
pub fn abstention(samples: &[JoinedSample<'_>], threshold: f64) -> AbstentionStats {
    let mut abstained_by_label: BTreeMap<Label, usize> = BTreeMap::new();
    let mut abstained = 0usize;
    let mut answered = 0usize;
    let mut answered_correct = 0usize;
    for s in samples {
        if s.confidence < threshold {
            abstained += 1;
            *abstained_by_label.entry(s.truth).or_insert(0) += 1;
        } else {
            answered += 1;
            if s.is_correct() {
                answered_correct += 1;
            }
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let unknown_abstained = abstained_by_label.get(&Label::Unknown).copied().unwrap_or(0);
    AbstentionStats {
        threshold,
        abstention_rate: ratio(abstained, samples.len()),
        answered_accuracy: ratio(answered_correct, answered),
        abstained,
        answered,
        abstained_by_label,
        unknown_abstention_rate: ratio(unknown_abstained, abstained),
    }
}

/// All selective-prediction metrics in one pass over the samples.
pub fn selective_report(
    samples: &[JoinedSample<'_>],
    coverage_points: usize,
    abstention_thresholds: &[f64],
) -> SelectiveReport {
    let curve = risk_coverage(samples, coverage_points);
    SelectiveReport {
        auroc_unknown: auroc_unknown(samples),
        aurc: aurc(&curve),
        risk_at_80_coverage: risk_at_80_coverage(&curve),
        abstention: abstention_thresholds
            .iter()
            .map(|t| abstention(samples, *t))
            .collect(),
        curve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onto_types::Label::{Known as K, Unknown as U};

    fn s(predicted: Label, truth: Label, confidence: f64) -> JoinedSample<'static> {
        JoinedSample {
            id: "x",
            predicted,
            truth,
            confidence,
        }
    }

    #[test]
    fn test_auroc_perfect_separation() {
        let samples = [s(U, U, 0.9), s(U, U, 0.8), s(K, K, 0.9), s(K, K, 0.95)];
        assert!((auroc_unknown(&samples) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_auroc_inverted_ranking() {
        // Confidently KNOWN on unknowns, hesitant on knowns.
        let samples = [s(K, U, 0.95), s(K, U, 0.9), s(K, K, 0.2), s(K, K, 0.1)];
        assert!(auroc_unknown(&samples).abs() < 1e-12);
    }

    #[test]
    fn test_auroc_single_class_is_half() {
        assert_eq!(auroc_unknown(&[s(K, K, 0.9), s(U, K, 0.4)]), 0.5);
        assert_eq!(auroc_unknown(&[]), 0.5);
    }

    #[test]
    fn test_risk_coverage_levels() {
        // Most confident item wrong, the rest right.
        let samples = [s(K, K, 0.6), s(K, U, 0.99), s(K, K, 0.7), s(K, K, 0.8)];
        let curve = risk_coverage(&samples, 4);
        assert_eq!(curve.len(), 4);
        assert!((curve[0].coverage - 0.25).abs() < 1e-12);
        assert_eq!(curve[0].risk, 1.0);
        assert!((curve[1].risk - 0.5).abs() < 1e-12);
        assert!((curve[3].risk - 0.25).abs() < 1e-12);
        assert_eq!(curve[3].coverage, 1.0);
    }

    #[test]
    fn test_risk_coverage_small_set_keeps_at_least_one() {
        let curve = risk_coverage(&[s(K, U, 0.5)], 20);
        assert_eq!(curve.len(), 20);
        assert!(curve.iter().all(|p| p.risk == 1.0));
    }

    #[test]
    fn test_aurc_flat_curve() {
        let curve = vec![
            CoveragePoint { coverage: 0.5, risk: 0.2 },
            CoveragePoint { coverage: 1.0, risk: 0.2 },
        ];
        assert!((aurc(&curve) - 0.1).abs() < 1e-12);
        assert_eq!(aurc(&[]), 0.0);
    }

    #[test]
    fn test_risk_at_80_index() {
        let curve: Vec<CoveragePoint> = (1..=20)
            .map(|i| CoveragePoint {
                coverage: i as f64 / 20.0,
                risk: i as f64,
            })
            .collect();
        // index 15 -> 16th point
        assert_eq!(risk_at_80_coverage(&curve), 16.0);
        assert_eq!(risk_at_80_coverage(&curve[..1]), 1.0);
        assert_eq!(risk_at_80_coverage(&[]), 0.0);
    }

    #[test]
    fn test_abstention_split() {
        let samples = [s(K, U, 0.3), s(U, U, 0.45), s(K, K, 0.5), s(K, U, 0.9)];
        let stats = abstention(&samples, 0.5);
        assert_eq!(stats.abstained, 2);
        assert_eq!(stats.answered, 2);
        assert!((stats.abstention_rate - 0.5).abs() < 1e-12);
        assert!((stats.answered_accuracy - 0.5).abs() < 1e-12);
        assert_eq!(stats.abstained_by_label.get(&U), Some(&2));
        assert_eq!(stats.unknown_abstention_rate, 1.0);
    }

    #[test]
    fn test_abstention_nothing_answered() {
        let stats = abstention(&[s(K, K, 0.1)], 0.5);
        assert_eq!(stats.answered_accuracy, 0.0);
        assert_eq!(stats.abstention_rate, 1.0);
    }

    #[test]
    fn test_report_on_empty_input() {
        let report = selective_report(&[], 20, &[0.5, 0.7]);
        assert!(report.curve.is_empty());
        assert_eq!(report.aurc, 0.0);
        assert_eq!(report.auroc_unknown, 0.5);
        assert_eq!(report.abstention.len(), 2);
        assert_eq!(report.abstention[0].abstention_rate, 0.0);
    }
}
