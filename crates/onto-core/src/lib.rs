// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Core Engine
// (C) 2026 The ONTO Kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Deterministic scoring of epistemic discipline: lexical pattern
//! scoring of free text, calibration and unknown-detection metrics over
//! labelled prediction sets, and the risk & compliance classifier.
//!
//! # Invariants
//!
//! 1. **Determinism**: identical inputs and configuration produce
//!    bit-identical results. Nothing here samples, caches or reads
//!    global state; all sorts are stable.
//!
//! 2. **Boundedness**: ECE, Brier, U-Recall, U-Precision and U-F1 are in
//!    `[0, 1]`; the risk score is in `[0, 100]`. Non-finite intermediate
//!    values are clamped and logged.
//!
//! 3. **No partial evaluation**: a schema or join error fails the whole
//!    call. Degenerate but valid inputs succeed with vacuous metrics and
//!    a `SampleWarning`.
//!
//! 4. **Tables are data**: thresholds, domain modifiers and the pattern
//!    vocabulary live in the versioned `Ruleset`, not in branching logic.

pub mod calibration;
pub mod classifier;
pub mod detection;
pub mod evaluator;
pub mod join;
pub mod jsonl;
pub mod pattern;
pub mod selective;

pub use evaluator::Evaluator;
pub use join::{join, JoinedSample};
pub use jsonl::{parse_ground_truth, parse_predictions};
pub use pattern::PatternScorer;
