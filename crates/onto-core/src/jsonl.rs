// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — JSON-Lines Record Parsing
// ─────────────────────────────────────────────────────────────────────
//! Parses submission text, one JSON object per line.
//!
//! Operates on in-memory text only; reading files is the caller's job.
//! Every defect is a `Schema` error naming the record id, or `line N`
//! when no usable id is available. Nothing is dropped or defaulted.

use serde::Deserialize;
use serde_json::Value;

use onto_types::{GroundTruth, Label, OntoError, OntoResult, Prediction};

#[derive(Deserialize)]
struct RawPrediction {
    #[serde(alias = "sample_id")]
    id: Option<Value>,
    #[serde(alias = "predicted_label")]
    label: Option<Value>,
    confidence: Option<Value>,
}

#[derive(Deserialize)]
struct RawGroundTruth {
    #[serde(alias = "sample_id")]
    id: Option<Value>,
    label: Option<Value>,
}

/// Parse prediction lines (`{id, label, confidence}`).
pub fn parse_predictions(text: &str) -> OntoResult<Vec<Prediction>> {
    records(text)
        .map(|(line_no, line)| {
            let raw: RawPrediction = parse_line(line_no, line)?;
            let id = require_id(raw.id, line_no)?;
            let label = require_label(raw.label, &id)?;
            let confidence = require_confidence(raw.confidence, &id)?;
            Prediction::new(id, label, confidence)
        })
        .collect()
}

/// Parse ground-truth lines (`{id, label}`).
pub fn parse_ground_truth(text: &str) -> OntoResult<Vec<GroundTruth>> {
    records(text)
        .map(|(line_no, line)| {
            let raw: RawGroundTruth = parse_line(line_no, line)?;
            let id = require_id(raw.id, line_no)?;
            let label = require_label(raw.label, &id)?;
            GroundTruth::new(id, label)
        })
        .collect()
}

/// Non-blank lines with 1-based line numbers.
fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn line_ref(line_no: usize) -> String {
    format!("line {line_no}")
}

/// Each line must hold a JSON object; arrays and scalars are rejected
/// before the fields are read.
fn parse_line<T: for<'de> Deserialize<'de>>(line_no: usize, line: &str) -> OntoResult<T> {
    let invalid = |e: serde_json::Error| {
        OntoError::schema(line_ref(line_no), "<record>", format!("invalid JSON: {e}"))
    };
    match serde_json::from_str::<Value>(line).map_err(invalid)? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(invalid),
        other => Err(OntoError::schema(
            line_ref(line_no),
            "<record>",
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn require_id(value: Option<Value>, line_no: usize) -> OntoResult<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(OntoError::schema(line_ref(line_no), "id", "id is empty")),
        Some(other) => Err(OntoError::schema(
            line_ref(line_no),
            "id",
            format!("id must be a string, got {other}"),
        )),
        None => Err(OntoError::schema(line_ref(line_no), "id", "missing field")),
    }
}

fn require_label(value: Option<Value>, id: &str) -> OntoResult<Label> {
    match value {
        Some(Value::String(s)) => s
            .parse::<Label>()
            .map_err(|reason| OntoError::schema(id, "label", reason)),
        Some(other) => Err(OntoError::schema(
            id,
            "label",
            format!("label must be a string, got {other}"),
        )),
        None => Err(OntoError::schema(id, "label", "missing field")),
    }
}

fn require_confidence(value: Option<Value>, id: &str) -> OntoResult<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            OntoError::schema(id, "confidence", format!("not representable as f64: {n}"))
        }),
        Some(other) => Err(OntoError::schema(
            id,
            "confidence",
            format!("confidence must be a number, got {other}"),
        )),
        None => Err(OntoError::schema(id, "confidence", "missing field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_parts(err: OntoError) -> (String, String) {
        match err {
            OntoError::Schema { record, field, .. } => (record, field),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_predictions() {
        let text = r#"
{"id": "q1", "label": "KNOWN", "confidence": 0.9}

{"id": "q2", "label": "UNKNOWN", "confidence": 1}
"#;
        let preds = parse_predictions(text).unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[1].label, Label::Unknown);
        assert_eq!(preds[1].confidence, 1.0);
    }

    #[test]
    fn test_legacy_field_aliases() {
        let text = r#"{"sample_id": "s1", "predicted_label": "CONTRADICTION", "confidence": 0.3}"#;
        let preds = parse_predictions(text).unwrap();
        assert_eq!(preds[0].id, "s1");
        assert_eq!(preds[0].label, Label::Contradiction);
    }

    #[test]
    fn test_out_of_range_confidence_names_record() {
        let text = r#"{"id": "q9", "label": "KNOWN", "confidence": 1.2}"#;
        let (record, field) = schema_parts(parse_predictions(text).unwrap_err());
        assert_eq!(record, "q9");
        assert_eq!(field, "confidence");
    }

    #[test]
    fn test_unrecognised_label_names_record() {
        let text = r#"{"id": "q3", "label": "MAYBE", "confidence": 0.5}"#;
        let (record, field) = schema_parts(parse_predictions(text).unwrap_err());
        assert_eq!(record, "q3");
        assert_eq!(field, "label");
    }

    #[test]
    fn test_missing_confidence() {
        let text = r#"{"id": "q4", "label": "KNOWN"}"#;
        let (record, field) = schema_parts(parse_predictions(text).unwrap_err());
        assert_eq!((record.as_str(), field.as_str()), ("q4", "confidence"));
    }

    #[test]
    fn test_string_confidence_not_coerced() {
        let text = r#"{"id": "q5", "label": "KNOWN", "confidence": "0.5"}"#;
        assert!(parse_predictions(text).is_err());
    }

    #[test]
    fn test_missing_id_reports_line() {
        let text = "{\"id\": \"a\", \"label\": \"KNOWN\"}\n{\"label\": \"KNOWN\"}";
        let (record, field) = schema_parts(parse_ground_truth(text).unwrap_err());
        assert_eq!(record, "line 2");
        assert_eq!(field, "id");
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let text = "{\"id\": \"a\", \"label\": \"KNOWN\"}\n\n{broken";
        let (record, _) = schema_parts(parse_ground_truth(text).unwrap_err());
        assert_eq!(record, "line 3");
    }

    #[test]
    fn test_array_record_rejected() {
        let (record, field) =
            schema_parts(parse_predictions(r#"["q1","KNOWN",0.9]"#).unwrap_err());
        assert_eq!((record.as_str(), field.as_str()), ("line 1", "<record>"));

        let text = "{\"id\": \"a\", \"label\": \"KNOWN\"}\n[\"q1\",\"UNKNOWN\"]";
        let (record, _) = schema_parts(parse_ground_truth(text).unwrap_err());
        assert_eq!(record, "line 2");
    }

    #[test]
    fn test_scalar_record_rejected() {
        let err = parse_ground_truth("\"q1\"").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got a string"));
    }

    #[test]
    fn test_numeric_id_rejected() {
        let text = r#"{"id": 7, "label": "KNOWN"}"#;
        assert!(parse_ground_truth(text).is_err());
    }

    #[test]
    fn test_empty_text_yields_no_records() {
        assert!(parse_predictions("\n  \n").unwrap().is_empty());
    }
}
