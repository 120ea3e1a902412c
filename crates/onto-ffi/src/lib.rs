// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — PyO3 FFI Bindings
// (C) 2026 The ONTO Kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied; PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the ONTO epistemic kernel.
//!
//! # FFI Safety
//!
//! - Engine errors become `ValueError`; non-`str` text arguments fail
//!   argument extraction with `TypeError` before any Rust code runs.
//! - Records are copied out of Python objects before evaluation, and the
//!   GIL is released for the evaluation itself.
//! - Config is validated before an `Evaluator` is stored.
//!
//! Install: `pip install -e crates/onto-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from onto_kernel import Evaluator
//!
//! ev = Evaluator()
//! ev.score_text("Perhaps 12% more, according to a study by Lee.")
//! result = ev.evaluate(
//!     [{"id": "q1", "label": "UNKNOWN", "confidence": 0.3}],
//!     [{"id": "q1", "label": "UNKNOWN"}],
//!     domain="medical",
//! )
//! print(result.summary())
//! ```

use std::str::FromStr;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyList};
use pyo3::IntoPyObjectExt;
use serde_json::Value;

use onto_core::Evaluator;
use onto_types::{
    Category, Domain, EngineConfig, EvaluationResult, GroundTruth, Label, OntoError, Prediction,
    TextScore, DEFAULT_RULESET_VERSION,
};

fn value_error(err: OntoError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ─── PyEngineConfig ─────────────────────────────────────────────────

/// Python-visible engine configuration.
#[pyclass(name = "EngineConfig")]
#[derive(Clone)]
struct PyEngineConfig {
    inner: EngineConfig,
}

#[pymethods]
impl PyEngineConfig {
    #[new]
    #[pyo3(signature = (
        n_bins = 10,
        uncertainty_threshold = 0.7,
        strict_join = false,
        min_sample_size = 30,
    ))]
    fn new(
        n_bins: usize,
        uncertainty_threshold: f64,
        strict_join: bool,
        min_sample_size: usize,
    ) -> PyResult<Self> {
        let config = EngineConfig {
            n_bins,
            uncertainty_threshold,
            strict_join,
            min_sample_size,
            ..Default::default()
        };
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string. Missing fields take their defaults.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = EngineConfig::from_json(json).map_err(value_error)?;
        config.validate().map_err(value_error)?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json_pretty().map_err(value_error)
    }

    #[getter]
    fn n_bins(&self) -> usize {
        self.inner.n_bins
    }

    #[getter]
    fn uncertainty_threshold(&self) -> f64 {
        self.inner.uncertainty_threshold
    }

    #[getter]
    fn strict_join(&self) -> bool {
        self.inner.strict_join
    }

    #[getter]
    fn ruleset_version(&self) -> String {
        self.inner.ruleset.version.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(n_bins={}, uncertainty_threshold={}, strict_join={}, ruleset={:?})",
            self.inner.n_bins,
            self.inner.uncertainty_threshold,
            self.inner.strict_join,
            self.inner.ruleset.version
        )
    }
}

// ─── PyEvaluationResult ─────────────────────────────────────────────

/// Python-visible immutable evaluation result.
#[pyclass(name = "EvaluationResult", frozen)]
#[derive(Clone)]
struct PyEvaluationResult {
    inner: EvaluationResult,
}

#[pymethods]
impl PyEvaluationResult {
    #[getter]
    fn ruleset_version(&self) -> &str {
        self.inner.ruleset_version()
    }

    #[getter]
    fn domain(&self) -> &'static str {
        self.inner.domain().as_str()
    }

    #[getter]
    fn n_samples(&self) -> usize {
        self.inner.n_samples()
    }

    #[getter]
    fn n_bins(&self) -> usize {
        self.inner.n_bins()
    }

    #[getter]
    fn u_precision(&self) -> f64 {
        self.inner.u_precision()
    }

    #[getter]
    fn u_recall(&self) -> f64 {
        self.inner.u_recall()
    }

    #[getter]
    fn u_f1(&self) -> f64 {
        self.inner.u_f1()
    }

    #[getter]
    fn accuracy(&self) -> f64 {
        self.inner.accuracy()
    }

    #[getter]
    fn ece(&self) -> f64 {
        self.inner.ece()
    }

    #[getter]
    fn brier_score(&self) -> f64 {
        self.inner.brier()
    }

    #[getter]
    fn overconfidence_rate(&self) -> f64 {
        self.inner.overconfidence_rate()
    }

    #[getter]
    fn risk_score(&self) -> f64 {
        self.inner.risk_score()
    }

    #[getter]
    fn risk_level(&self) -> &'static str {
        self.inner.risk_level().as_str()
    }

    #[getter]
    fn compliance_level(&self) -> &'static str {
        self.inner.compliance_level().as_str()
    }

    #[getter]
    fn regulatory_tags(&self) -> Vec<String> {
        self.inner.regulatory_tags().to_vec()
    }

    #[getter]
    fn recommendations(&self) -> Vec<String> {
        self.inner.recommendations().to_vec()
    }

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.inner.warnings().iter().map(|w| w.to_string()).collect()
    }

    #[getter]
    fn low_confidence(&self) -> bool {
        self.inner.is_low_confidence()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (key, value) in self.inner.to_map() {
            dict.set_item(key, json_to_py(py, &value)?)?;
        }
        Ok(dict)
    }

    /// Full result, including per-bin and curve detail, as JSON.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn summary(&self) -> String {
        self.inner.summary()
    }

    fn citation(&self) -> String {
        self.inner.citation()
    }

    fn __repr__(&self) -> String {
        format!(
            "EvaluationResult(u_recall={:.4}, ece={:.4}, risk_level={}, compliance_level={})",
            self.inner.u_recall(),
            self.inner.ece(),
            self.inner.risk_level(),
            self.inner.compliance_level()
        )
    }
}

// ─── PyEvaluator ────────────────────────────────────────────────────

/// Python-visible evaluator bound to one configuration.
#[pyclass(name = "Evaluator", frozen)]
struct PyEvaluator {
    inner: Evaluator,
}

#[pymethods]
impl PyEvaluator {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyRef<'_, PyEngineConfig>>) -> PyResult<Self> {
        let config = config.map(|c| c.inner.clone()).unwrap_or_default();
        let inner = Evaluator::new(config).map_err(value_error)?;
        Ok(Self { inner })
    }

    /// Score one response; returns category counts and the composite.
    fn score_text<'py>(&self, py: Python<'py>, text: &str) -> PyResult<Bound<'py, PyDict>> {
        text_score_dict(py, &self.inner.score_text(text))
    }

    fn score_texts<'py>(
        &self,
        py: Python<'py>,
        texts: Vec<String>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .score_texts(&texts)
            .iter()
            .map(|s| text_score_dict(py, s))
            .collect()
    }

    /// Evaluate prediction dicts against ground-truth dicts.
    #[pyo3(signature = (predictions, ground_truth, domain = "general"))]
    fn evaluate(
        &self,
        py: Python<'_>,
        predictions: &Bound<'_, PyList>,
        ground_truth: &Bound<'_, PyList>,
        domain: &str,
    ) -> PyResult<PyEvaluationResult> {
        let domain = Domain::from_str(domain).map_err(value_error)?;
        let preds = extract_predictions(predictions)?;
        let truth = extract_ground_truth(ground_truth)?;
        let result = py
            .allow_threads(|| self.inner.evaluate(&preds, &truth, domain))
            .map_err(value_error)?;
        Ok(PyEvaluationResult { inner: result })
    }

    #[getter]
    fn ruleset_version(&self) -> String {
        self.inner.config().ruleset.version.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "Evaluator(ruleset={:?}, n_bins={})",
            self.inner.config().ruleset.version,
            self.inner.config().n_bins
        )
    }
}

// ─── Conversions ────────────────────────────────────────────────────

fn text_score_dict<'py>(py: Python<'py>, score: &TextScore) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for category in Category::ALL {
        dict.set_item(category.code(), score.counts.get(category))?;
    }
    dict.set_item("composite", score.composite)?;
    dict.set_item("confidence_statements", score.confidence_statements)?;
    dict.set_item("word_count", score.counts.word_count)?;
    dict.set_item("ruleset_version", score.ruleset_version.as_str())?;
    Ok(dict)
}

fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    match value {
        Value::Null => Ok(py.None()),
        Value::Bool(b) => b.into_py_any(py),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into_py_any(py),
            None => n.as_f64().unwrap_or(f64::NAN).into_py_any(py),
        },
        Value::String(s) => s.as_str().into_py_any(py),
        Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(json_to_py(py, item)?)?;
            }
            list.into_py_any(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (k, v) in map {
                dict.set_item(k.as_str(), json_to_py(py, v)?)?;
            }
            dict.into_py_any(py)
        }
    }
}

/// First present key among `names`.
fn field<'py>(dict: &Bound<'py, PyDict>, names: &[&str]) -> PyResult<Option<Bound<'py, PyAny>>> {
    for name in names {
        if let Some(v) = dict.get_item(*name)? {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

fn record_dict<'a, 'py>(
    item: &'a Bound<'py, PyAny>,
    index: usize,
) -> PyResult<&'a Bound<'py, PyDict>> {
    item.downcast::<PyDict>().map_err(|_| {
        value_error(OntoError::schema(
            format!("record {}", index + 1),
            "<record>",
            "expected a dict",
        ))
    })
}

fn record_id(dict: &Bound<'_, PyDict>, index: usize) -> PyResult<String> {
    let at = || format!("record {}", index + 1);
    let value = field(dict, &["id", "sample_id"])?
        .ok_or_else(|| value_error(OntoError::schema(at(), "id", "missing field")))?;
    value
        .extract::<String>()
        .map_err(|_| value_error(OntoError::schema(at(), "id", "id must be a string")))
}

fn record_label(dict: &Bound<'_, PyDict>, id: &str, names: &[&str]) -> PyResult<Label> {
    let value = field(dict, names)?
        .ok_or_else(|| value_error(OntoError::schema(id, "label", "missing field")))?;
    let raw = value
        .extract::<String>()
        .map_err(|_| value_error(OntoError::schema(id, "label", "label must be a string")))?;
    raw.parse::<Label>()
        .map_err(|reason| value_error(OntoError::schema(id, "label", reason)))
}

/// Python `bool` subclasses `int`; it is refused like any other non-number.
fn record_confidence(dict: &Bound<'_, PyDict>, id: &str) -> PyResult<f64> {
    let not_a_number =
        || value_error(OntoError::schema(id, "confidence", "confidence must be a number"));
    let value = field(dict, &["confidence"])?
        .ok_or_else(|| value_error(OntoError::schema(id, "confidence", "missing field")))?;
    if value.is_instance_of::<PyBool>() {
        return Err(not_a_number());
    }
    value.extract::<f64>().map_err(|_| not_a_number())
}

fn extract_predictions(records: &Bound<'_, PyList>) -> PyResult<Vec<Prediction>> {
    records
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let dict = record_dict(&item, i)?;
            let id = record_id(dict, i)?;
            let label = record_label(dict, &id, &["label", "predicted_label"])?;
            let confidence = record_confidence(dict, &id)?;
            Prediction::new(id, label, confidence).map_err(value_error)
        })
        .collect()
}

fn extract_ground_truth(records: &Bound<'_, PyList>) -> PyResult<Vec<GroundTruth>> {
    records
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let dict = record_dict(&item, i)?;
            let id = record_id(dict, i)?;
            let label = record_label(dict, &id, &["label"])?;
            GroundTruth::new(id, label).map_err(value_error)
        })
        .collect()
}

// ─── Module Registration ────────────────────────────────────────────

/// ONTO epistemic kernel: deterministic scoring and compliance
/// classification.
///
/// - `EngineConfig`: configuration
/// - `Evaluator`: text scoring and set evaluation
/// - `EvaluationResult`: immutable result with `to_dict`, `summary`, `citation`
#[pymodule]
fn onto_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEngineConfig>()?;
    m.add_class::<PyEvaluator>()?;
    m.add_class::<PyEvaluationResult>()?;
    m.add("RULESET_VERSION", DEFAULT_RULESET_VERSION)?;
    Ok(())
}
