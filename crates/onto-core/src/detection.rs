// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Unknown-Detection Metrics
// ─────────────────────────────────────────────────────────────────────
//! One-vs-rest precision/recall/F1 over `(predicted, true)` label pairs,
//! with UNKNOWN as the headline positive class.
//!
//! Zero-denominator convention:
//! - recall is 1.0 when the class never occurs in ground truth (nothing
//!   could have been missed);
//! - precision is 1.0 when the class is neither predicted nor present;
//! - precision is 0.0 when the class is present but never predicted.

use onto_types::score::{clamp_unit, ClassMetrics};
use onto_types::{Label, OntoError, OntoResult};

/// Metrics for `positive` over `(predicted, truth)` pairs.
pub fn class_metrics(pairs: &[(Label, Label)], positive: Label) -> ClassMetrics {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for &(predicted, truth) in pairs {
        match (predicted == positive, truth == positive) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => {}
        }
    }

    let recall = if tp + fn_ == 0 {
        1.0
    } else {
        tp as f64 / (tp + fn_) as f64
    };
    let precision = match (tp + fp, tp + fn_) {
        (0, 0) => 1.0,
        (0, _) => 0.0,
        (predicted, _) => tp as f64 / predicted as f64,
    };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        label: positive,
        true_positives: tp,
        false_positives: fp,
        false_negatives: fn_,
        precision: clamp_unit(precision),
        recall: clamp_unit(recall),
        f1: clamp_unit(f1),
    }
}

/// UNKNOWN-class detection metrics (U-Precision, U-Recall, U-F1).
pub fn unknown_detection(pairs: &[(Label, Label)]) -> ClassMetrics {
    class_metrics(pairs, Label::Unknown)
}

/// Metrics for every label, in [`Label::ALL`] order.
pub fn per_class(pairs: &[(Label, Label)]) -> Vec<ClassMetrics> {
    Label::ALL.iter().map(|l| class_metrics(pairs, *l)).collect()
}

/// Exact-label agreement. Empty input yields 1.0 (no errors made).
pub fn accuracy(pairs: &[(Label, Label)]) -> f64 {
    if pairs.is_empty() {
        return 1.0;
    }
    let correct = pairs.iter().filter(|(p, t)| p == t).count();
    correct as f64 / pairs.len() as f64
}

/// Mean F1 over the given per-class rows.
pub fn macro_f1(rows: &[ClassMetrics]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.f1).sum::<f64>() / rows.len() as f64
}

/// Fraction of incorrect items stated with confidence below `threshold`.
///
/// 1.0 when there are no incorrect items.
pub fn uncertainty_recall(pairs: &[(f64, bool)], threshold: f64) -> OntoResult<f64> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(OntoError::Validation(format!(
            "uncertainty threshold must be in [0, 1], got {threshold}"
        )));
    }
    let incorrect: Vec<f64> = pairs.iter().filter(|(_, ok)| !ok).map(|(c, _)| *c).collect();
    if incorrect.is_empty() {
        return Ok(1.0);
    }
    let flagged = incorrect.iter().filter(|c| **c < threshold).count();
    Ok(flagged as f64 / incorrect.len() as f64)
}
