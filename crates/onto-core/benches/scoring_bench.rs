// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Scoring Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for text scoring and full set evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use onto_core::Evaluator;
use onto_types::{Domain, EngineConfig, GroundTruth, Label, Prediction};

const RESPONSE: &str = "Revenue grew 12% over 3 quarters according to a study by Harvard \
    (Smith, 2021). However, the estimate is uncertain and may not generalise; \
    confidence: 0.7. On the other hand, a significant rise is possible.";

fn labelled_set(n: usize) -> (Vec<Prediction>, Vec<GroundTruth>) {
    let labels = Label::ALL;
    let mut preds = Vec::with_capacity(n);
    let mut truth = Vec::with_capacity(n);
    for i in 0..n {
        let id = format!("q{i}");
        let predicted = labels[i % 3];
        let actual = labels[(i / 2) % 3];
        let confidence = (i % 101) as f64 / 100.0;
        preds.push(Prediction::new(id.clone(), predicted, confidence).unwrap());
        truth.push(GroundTruth::new(id, actual).unwrap());
    }
    (preds, truth)
}

// ── PatternScorer ───────────────────────────────────────────────────

fn bench_score_text(c: &mut Criterion) {
    let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
    c.bench_function("score_text_short", |b| {
        b.iter(|| evaluator.score_text(black_box(RESPONSE)))
    });
}

fn bench_score_text_long(c: &mut Criterion) {
    let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
    let long = RESPONSE.repeat(50);
    c.bench_function("score_text_long", |b| {
        b.iter(|| evaluator.score_text(black_box(&long)))
    });
}

// ── Evaluator.evaluate() ────────────────────────────────────────────

fn bench_evaluate_100(c: &mut Criterion) {
    let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
    let (preds, truth) = labelled_set(100);
    c.bench_function("evaluate_100", |b| {
        b.iter(|| evaluator.evaluate(black_box(&preds), black_box(&truth), Domain::General))
    });
}

fn bench_evaluate_10k(c: &mut Criterion) {
    let evaluator = Evaluator::new(EngineConfig::default()).unwrap();
    let (preds, truth) = labelled_set(10_000);
    c.bench_function("evaluate_10k", |b| {
        b.iter(|| evaluator.evaluate(black_box(&preds), black_box(&truth), Domain::Medical))
    });
}

criterion_group!(
    benches,
    bench_score_text,
    bench_score_text_long,
    bench_evaluate_100,
    bench_evaluate_10k,
);
criterion_main!(benches);
