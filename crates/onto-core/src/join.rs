// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Prediction / Ground-Truth Join
// ─────────────────────────────────────────────────────────────────────
//! Pairs predictions with ground truth by id.
//!
//! A prediction without ground truth is always an error; in strict mode
//! a ground-truth record without a prediction is too. Partial evaluation
//! over mismatched sets is never attempted.

use std::collections::{HashMap, HashSet};

use onto_types::{GroundTruth, Label, OntoError, OntoResult, Prediction};

/// One matched item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedSample<'a> {
    pub id: &'a str,
    pub predicted: Label,
    pub truth: Label,
    pub confidence: f64,
}

impl JoinedSample<'_> {
    pub fn is_correct(&self) -> bool {
        self.predicted == self.truth
    }
}

/// Join by id, preserving prediction order.
pub fn join<'a>(
    predictions: &'a [Prediction],
    ground_truth: &'a [GroundTruth],
    strict: bool,
) -> OntoResult<Vec<JoinedSample<'a>>> {
    let mut truth_by_id: HashMap<&str, Label> = HashMap::with_capacity(ground_truth.len());
    for gt in ground_truth {
        gt.validate()?;
        if truth_by_id.insert(gt.id.as_str(), gt.label).is_some() {
            return Err(OntoError::schema(&gt.id, "id", "duplicate ground-truth id"));
        }
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(predictions.len());
    let mut samples = Vec::with_capacity(predictions.len());
    for p in predictions {
        p.validate()?;
        if !seen.insert(p.id.as_str()) {
            return Err(OntoError::schema(&p.id, "id", "duplicate prediction id"));
        }
        let truth = *truth_by_id
            .get(p.id.as_str())
            .ok_or_else(|| OntoError::MissingGroundTruth { id: p.id.clone() })?;
        samples.push(JoinedSample {
            id: p.id.as_str(),
            predicted: p.label,
            truth,
            confidence: p.confidence,
        });
    }

    if strict {
        // Ground-truth order keeps the reported id deterministic.
        if let Some(gt) = ground_truth.iter().find(|gt| !seen.contains(gt.id.as_str())) {
            return Err(OntoError::MissingPrediction { id: gt.id.clone() });
        }
    } else if ground_truth.len() > samples.len() {
        log::debug!(
            "join: {} ground-truth records have no prediction (non-strict)",
            ground_truth.len() - samples.len()
        );
    }

    Ok(samples)
}
