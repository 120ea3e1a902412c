// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Evaluator
// ─────────────────────────────────────────────────────────────────────
//! Entry point tying the metric modules together.
//!
//! An [`Evaluator`] owns a validated [`EngineConfig`] and the compiled
//! pattern scorer. It holds no mutable state, so a single instance can
//! serve concurrent callers and identical inputs always produce
//! identical results.

use onto_types::{
    Domain, EngineConfig, EvaluationParts, EvaluationResult, GroundTruth, Label, OntoResult,
    Prediction, SampleWarning, TextScore,
};

use crate::join::{join, JoinedSample};
use crate::pattern::PatternScorer;
use crate::{calibration, classifier, detection, selective};

#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EngineConfig,
    scorer: PatternScorer,
}

impl Evaluator {
    /// Validate `config` and compile its vocabulary.
    pub fn new(config: EngineConfig) -> OntoResult<Self> {
        config.validate()?;
        let scorer = PatternScorer::new(&config.ruleset.vocabulary, config.ruleset.version.clone())?;
        log::debug!(
            "evaluator ready: ruleset={} n_bins={} threshold={}",
            config.ruleset.version,
            config.n_bins,
            config.uncertainty_threshold
        );
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer(&self) -> &PatternScorer {
        &self.scorer
    }

    /// Score one free-text response.
    pub fn score_text(&self, text: &str) -> TextScore {
        self.scorer.score(text)
    }

    /// Score a batch of responses, in input order.
    pub fn score_texts<S: AsRef<str>>(&self, texts: &[S]) -> Vec<TextScore> {
        texts.iter().map(|t| self.scorer.score(t.as_ref())).collect()
    }

    /// Evaluate a prediction set against ground truth.
    ///
    /// Fails on schema or join errors; never evaluates a partial set.
    /// Degenerate inputs (empty set, no UNKNOWN items) succeed with
    /// vacuous metrics and carry a [`SampleWarning`].
    pub fn evaluate(
        &self,
        predictions: &[Prediction],
        ground_truth: &[GroundTruth],
        domain: Domain,
    ) -> OntoResult<EvaluationResult> {
        let samples = join(predictions, ground_truth, self.config.strict_join)?;
        self.evaluate_joined(&samples, domain)
    }

    fn evaluate_joined(
        &self,
        samples: &[JoinedSample<'_>],
        domain: Domain,
    ) -> OntoResult<EvaluationResult> {
        let cfg = &self.config;
        let ruleset = &cfg.ruleset;

        let label_pairs: Vec<(Label, Label)> =
            samples.iter().map(|s| (s.predicted, s.truth)).collect();
        let outcome_pairs: Vec<(f64, bool)> =
            samples.iter().map(|s| (s.confidence, s.is_correct())).collect();

        let per_class = detection::per_class(&label_pairs);
        let unknown = detection::unknown_detection(&label_pairs);
        let accuracy = detection::accuracy(&label_pairs);
        let macro_f1 = detection::macro_f1(&per_class);
        let uncertainty_recall =
            detection::uncertainty_recall(&outcome_pairs, cfg.uncertainty_threshold)?;
        let calibration = calibration::calibrate(&outcome_pairs, cfg.n_bins)?;
        let selective = selective::selective_report(
            samples,
            cfg.coverage_points,
            &cfg.abstention_thresholds,
        );

        let risk = classifier::assess_risk(calibration.ece, unknown.recall, domain, ruleset)?;
        let compliance =
            classifier::compliance_level(unknown.recall, calibration.ece, &ruleset.compliance_tiers);
        let scorecard =
            classifier::scorecard(unknown.recall, calibration.ece, accuracy, &ruleset.scorecard);
        let contradiction_f1 = per_class
            .iter()
            .find(|m| m.label == Label::Contradiction)
            .map_or(0.0, |m| m.f1);
        let recommendations = classifier::recommendations(
            unknown.recall,
            calibration.ece,
            contradiction_f1,
            risk.level,
            &ruleset.advisory,
        );
        let regulatory_tags = classifier::regulatory_tags(domain, ruleset);

        let warnings = self.sample_warnings(samples, &unknown);
        for w in &warnings {
            log::warn!("evaluation: {w}");
        }
        log::info!(
            "evaluated n={} domain={domain}: U-Recall={:.4} ECE={:.4} risk={:.1} ({}) compliance={}",
            samples.len(),
            unknown.recall,
            calibration.ece,
            risk.score,
            risk.level,
            compliance
        );

        Ok(EvaluationResult::from(EvaluationParts {
            ruleset_version: ruleset.version.clone(),
            domain,
            n_samples: samples.len(),
            per_class,
            unknown_detection: unknown,
            accuracy,
            macro_f1,
            uncertainty_recall,
            uncertainty_threshold: cfg.uncertainty_threshold,
            calibration,
            selective,
            risk,
            compliance,
            scorecard,
            regulatory_tags,
            recommendations,
            warnings,
        }))
    }

    fn sample_warnings(
        &self,
        samples: &[JoinedSample<'_>],
        unknown: &onto_types::ClassMetrics,
    ) -> Vec<SampleWarning> {
        if samples.is_empty() {
            return vec![SampleWarning::EmptyEvaluation];
        }
        let mut warnings = Vec::new();
        if unknown.support() == 0 {
            warnings.push(SampleWarning::NoUnknownGroundTruth);
        }
        if unknown.predicted() == 0 {
            warnings.push(SampleWarning::NoUnknownPredicted);
        }
        if samples.len() < self.config.min_sample_size {
            warnings.push(SampleWarning::SmallSample {
                n: samples.len(),
                minimum: self.config.min_sample_size,
            });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onto_types::{ComplianceLevel, OntoError, RiskLevel};

    fn evaluator() -> Evaluator {
        Evaluator::new(EngineConfig::default()).unwrap()
    }

    fn pred(id: &str, label: Label, c: f64) -> Prediction {
        Prediction::new(id, label, c).unwrap()
    }

    fn gt(id: &str, label: Label) -> GroundTruth {
        GroundTruth::new(id, label).unwrap()
    }

    #[test]
    fn test_literal_perfect_detection_scenario() {
        let preds = [pred("q1", Label::Known, 0.9), pred("q2", Label::Unknown, 0.2)];
        let truth = [gt("q1", Label::Known), gt("q2", Label::Unknown)];
        let result = evaluator().evaluate(&preds, &truth, Domain::General).unwrap();
        assert_eq!(result.u_recall(), 1.0);
        assert_eq!(result.u_precision(), 1.0);
        assert_eq!(result.u_f1(), 1.0);
        assert_eq!(result.accuracy(), 1.0);
    }

    #[test]
    fn test_empty_set_is_vacuous_with_warning() {
        let result = evaluator().evaluate(&[], &[], Domain::General).unwrap();
        assert_eq!(result.n_samples(), 0);
        assert_eq!(result.ece(), 0.0);
        assert_eq!(result.brier(), 0.0);
        assert_eq!(result.warnings(), &[SampleWarning::EmptyEvaluation]);
        assert!(result.is_low_confidence());
    }

    #[test]
    fn test_no_unknown_ground_truth_flagged() {
        let preds = [pred("q1", Label::Known, 0.9)];
        let truth = [gt("q1", Label::Known)];
        let result = evaluator().evaluate(&preds, &truth, Domain::General).unwrap();
        assert_eq!(result.u_recall(), 1.0);
        assert!(result.warnings().contains(&SampleWarning::NoUnknownGroundTruth));
    }

    #[test]
    fn test_join_failure_propagates() {
        let preds = [pred("q1", Label::Known, 0.9)];
        let err = evaluator().evaluate(&preds, &[], Domain::General).unwrap_err();
        assert_eq!(err, OntoError::MissingGroundTruth { id: "q1".into() });
    }

    #[test]
    fn test_strict_join_from_config() {
        let cfg = EngineConfig {
            strict_join: true,
            ..Default::default()
        };
        let ev = Evaluator::new(cfg).unwrap();
        let preds = [pred("q1", Label::Known, 0.9)];
        let truth = [gt("q1", Label::Known), gt("q2", Label::Unknown)];
        assert!(matches!(
            ev.evaluate(&preds, &truth, Domain::General),
            Err(OntoError::MissingPrediction { .. })
        ));
    }

    #[test]
    fn test_bin_count_reported() {
        let cfg = EngineConfig {
            n_bins: 15,
            ..Default::default()
        };
        let ev = Evaluator::new(cfg).unwrap();
        let result = ev.evaluate(&[], &[], Domain::General).unwrap();
        assert_eq!(result.n_bins(), 15);
        assert!(result.citation().contains("15 equal-width bins"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = EngineConfig {
            n_bins: 0,
            ..Default::default()
        };
        assert!(matches!(Evaluator::new(cfg), Err(OntoError::Config(_))));
    }

    #[test]
    fn test_confidently_wrong_model_is_critical() {
        let preds: Vec<Prediction> = (0..10)
            .map(|i| pred(&format!("q{i}"), Label::Known, 1.0))
            .collect();
        let truth: Vec<GroundTruth> = (0..10)
            .map(|i| gt(&format!("q{i}"), Label::Unknown))
            .collect();
        let result = evaluator().evaluate(&preds, &truth, Domain::Medical).unwrap();
        assert_eq!(result.u_recall(), 0.0);
        assert_eq!(result.ece(), 1.0);
        assert_eq!(result.risk_score(), 100.0);
        assert_eq!(result.risk_level(), RiskLevel::Critical);
        assert_eq!(result.compliance_level(), ComplianceLevel::None);
    }

    #[test]
    fn test_score_texts_in_order() {
        let ev = evaluator();
        let scores = ev.score_texts(&["12% and 3", "perhaps"]);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].composite, 2);
        assert_eq!(scores[1].composite, 1);
    }

    #[test]
    fn test_evaluator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Evaluator>();
    }
}
