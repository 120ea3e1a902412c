// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Text Reports
// ─────────────────────────────────────────────────────────────────────
//! Human-readable rendering of evaluation results and text scores.

use std::fmt;

use onto_types::{Category, EvaluationResult, TextScore};

/// Multi-section plain-text evaluation report.
pub struct EvaluationReport<'a>(pub &'a EvaluationResult);

impl fmt::Display for EvaluationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let cal = r.calibration();
        let sel = r.selective();
        let risk = r.risk();
        let card = r.scorecard();

        writeln!(f, "ONTO Epistemic Evaluation")?;
        writeln!(f, "=========================")?;
        writeln!(f, "Ruleset      {}", r.ruleset_version())?;
        writeln!(f, "Domain       {}", r.domain())?;
        writeln!(f, "Samples      {}", r.n_samples())?;
        writeln!(f)?;

        writeln!(f, "Unknown detection")?;
        writeln!(f, "  U-Precision  {:.4}", r.u_precision())?;
        writeln!(f, "  U-Recall     {:.4}", r.u_recall())?;
        writeln!(f, "  U-F1         {:.4}", r.u_f1())?;
        writeln!(f)?;

        writeln!(f, "Per-class        precision  recall      f1  support")?;
        for m in r.per_class() {
            writeln!(
                f,
                "  {:<14} {:>9.4} {:>7.4} {:>7.4} {:>8}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support()
            )?;
        }
        writeln!(f, "  accuracy {:.4}, macro-F1 {:.4}", r.accuracy(), r.macro_f1())?;
        writeln!(f)?;

        writeln!(f, "Calibration ({} equal-width bins)", cal.n_bins)?;
        writeln!(f, "  ECE                  {:.4}", cal.ece)?;
        writeln!(f, "  MCE                  {:.4}", cal.mce)?;
        writeln!(f, "  Brier                {:.4}", cal.brier)?;
        writeln!(f, "  Overconfidence rate  {:.4}", cal.overconfidence_rate)?;
        writeln!(f, "  Mean confidence      {:.4}", cal.mean_confidence)?;
        writeln!(f, "  Uncertainty recall   {:.4}", r.uncertainty_recall())?;
        writeln!(f)?;

        writeln!(f, "Selective prediction")?;
        writeln!(f, "  AUROC (UNKNOWN)      {:.4}", sel.auroc_unknown)?;
        writeln!(f, "  AURC                 {:.4}", sel.aurc)?;
        writeln!(f, "  Risk @ 80% coverage  {:.4}", sel.risk_at_80_coverage)?;
        for a in &sel.abstention {
            writeln!(
                f,
                "  Abstain < {:.2}: rate {:.4}, answered accuracy {:.4}, UNKNOWN share {:.4}",
                a.threshold, a.abstention_rate, a.answered_accuracy, a.unknown_abstention_rate
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Risk         {} ({:.1}/100, domain modifier {:+})",
            risk.level, risk.score, risk.domain_modifier
        )?;
        writeln!(f, "Compliance   {}", r.compliance_level())?;
        writeln!(
            f,
            "Scorecard    {:.1}/100, grade {}, {}",
            card.score, card.grade, card.status
        )?;

        write_list(f, "Regulatory frameworks", r.regulatory_tags())?;
        write_list(f, "Recommendations", r.recommendations())?;
        if r.is_low_confidence() {
            let warnings: Vec<String> = r.warnings().iter().map(|w| w.to_string()).collect();
            write_list(f, "Warnings (low-confidence result)", &warnings)?;
        }

        writeln!(f)?;
        write!(f, "{}", r.citation())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{title}")?;
    for item in items {
        writeln!(f, "  - {item}")?;
    }
    Ok(())
}

/// Category table for one scored text.
pub struct TextScoreReport<'a>(pub &'a TextScore);

impl fmt::Display for TextScoreReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        for category in Category::ALL {
            writeln!(
                f,
                "{:<5} {:<22} {:>5}",
                category.code(),
                category.name(),
                s.counts.get(category)
            )?;
        }
        writeln!(f, "words {}", s.counts.word_count)?;
        writeln!(f, "composite (QD+SS+UM+CP-VQ) {}", s.composite)?;
        write!(f, "ruleset {}", s.ruleset_version)
    }
}
