// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all kernel failures.
///
/// Every variant is a data-quality or configuration problem. Nothing
/// here is transient, so callers never retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OntoError {
    /// Malformed input record: missing field, out-of-range confidence,
    /// unrecognised label, duplicate id, unparseable line.
    #[error("schema error in record `{record}` (field `{field}`): {reason}")]
    Schema {
        record: String,
        field: String,
        reason: String,
    },

    /// A prediction id has no ground-truth counterpart.
    #[error("join error: prediction `{id}` has no matching ground truth")]
    MissingGroundTruth { id: String },

    /// A ground-truth id has no prediction (strict mode only).
    #[error("join error: ground truth `{id}` has no matching prediction")]
    MissingPrediction { id: String },

    /// Invalid engine configuration or ruleset table.
    #[error("config error: {0}")]
    Config(String),

    /// A vocabulary pattern failed to compile.
    #[error("pattern error in category {category}: {reason}")]
    Pattern { category: String, reason: String },

    /// Invalid argument passed directly to a metric function.
    #[error("validation error: {0}")]
    Validation(String),
}

impl OntoError {
    pub fn schema(
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Schema {
            record: record.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the submitted records rather than by
    /// the engine configuration.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::MissingGroundTruth { .. } | Self::MissingPrediction { .. }
        )
    }
}

pub type OntoResult<T> = Result<T, OntoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_names_record_and_field() {
        let err = OntoError::schema("q7", "confidence", "must be in [0, 1], got 1.2");
        assert_eq!(
            err.to_string(),
            "schema error in record `q7` (field `confidence`): must be in [0, 1], got 1.2"
        );
    }

    #[test]
    fn test_input_error_classification() {
        assert!(OntoError::schema("a", "b", "c").is_input_error());
        assert!(OntoError::MissingGroundTruth { id: "x".into() }.is_input_error());
        assert!(OntoError::MissingPrediction { id: "x".into() }.is_input_error());
        assert!(!OntoError::Config("bad".into()).is_input_error());
        assert!(!OntoError::Validation("bad".into()).is_input_error());
    }
}
