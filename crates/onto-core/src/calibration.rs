// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Calibration Metrics
// ─────────────────────────────────────────────────────────────────────
//! Binned calibration error (ECE/MCE), Brier score and overconfidence
//! rate over `(confidence, correct)` pairs.
//!
//! `[0, 1]` is split into `k` equal-width bins and a pair lands in
//! `min(floor(confidence * k), k - 1)`, so `1.0` falls into the last bin.
//! Empty bins contribute nothing and are never divided by.

use onto_types::score::{clamp_unit, CalibrationBin, CalibrationReport};
use onto_types::{OntoError, OntoResult};

/// Bin index for a confidence in [0, 1].
#[inline]
pub fn bin_index(confidence: f64, n_bins: usize) -> usize {
    ((confidence * n_bins as f64).floor() as usize).min(n_bins - 1)
}

/// Compute the calibration report.
///
/// Fails on `n_bins == 0` or any confidence outside [0, 1]. An empty
/// input is not an error: every metric is 0.0 and all bins are empty.
pub fn calibrate(pairs: &[(f64, bool)], n_bins: usize) -> OntoResult<CalibrationReport> {
    if n_bins == 0 {
        return Err(OntoError::Validation("n_bins must be >= 1".into()));
    }
    if let Some((i, (c, _))) = pairs
        .iter()
        .enumerate()
        .find(|(_, (c, _))| !c.is_finite() || !(0.0..=1.0).contains(c))
    {
        return Err(OntoError::Validation(format!(
            "confidence at position {i} must be in [0, 1], got {c}"
        )));
    }

    let mut counts = vec![0usize; n_bins];
    let mut conf_sums = vec![0.0f64; n_bins];
    let mut correct = vec![0usize; n_bins];
    for &(c, ok) in pairs {
        let b = bin_index(c, n_bins);
        counts[b] += 1;
        conf_sums[b] += c;
        if ok {
            correct[b] += 1;
        }
    }

    let width = 1.0 / n_bins as f64;
    let bins: Vec<CalibrationBin> = (0..n_bins)
        .map(|i| {
            let (mean_confidence, accuracy) = if counts[i] == 0 {
                (0.0, 0.0)
            } else {
                let n = counts[i] as f64;
                (conf_sums[i] / n, correct[i] as f64 / n)
            };
            CalibrationBin {
                index: i,
                lower: i as f64 * width,
                upper: if i + 1 == n_bins { 1.0 } else { (i + 1) as f64 * width },
                count: counts[i],
                mean_confidence,
                accuracy,
            }
        })
        .collect();

    let n = pairs.len();
    if n == 0 {
        log::debug!("calibrate: empty input, reporting vacuous zeros");
        return Ok(CalibrationReport {
            n_bins,
            bins,
            ece: 0.0,
            mce: 0.0,
            brier: 0.0,
            overconfidence_rate: 0.0,
            mean_confidence: 0.0,
            n_samples: 0,
        });
    }
    let total = n as f64;

    let mut ece = 0.0;
    let mut mce: f64 = 0.0;
    let mut overconfident = 0usize;
    for bin in bins.iter().filter(|b| !b.is_empty()) {
        ece += (bin.count as f64 / total) * bin.gap();
        mce = mce.max(bin.gap());
        if bin.is_overconfident() {
            overconfident += bin.count;
        }
    }

    Ok(CalibrationReport {
        n_bins,
        ece: clamp_unit(ece),
        mce: clamp_unit(mce),
        brier: clamp_unit(brier_score(pairs)),
        overconfidence_rate: clamp_unit(overconfident as f64 / total),
        mean_confidence: pairs.iter().map(|(c, _)| c).sum::<f64>() / total,
        n_samples: n,
        bins,
    })
}

/// Mean squared error between confidence and the 0/1 outcome.
///
/// No binning. Empty input yields 0.0.
pub fn brier_score(pairs: &[(f64, bool)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let sum: f64 = pairs
        .iter()
        .map(|&(c, ok)| {
            let y = if ok { 1.0 } else { 0.0 };
            (c - y) * (c - y)
        })
        .sum();
    sum / pairs.len() as f64
}
