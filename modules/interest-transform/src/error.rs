/// Result type alias for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Failures a mapping rule can raise once a record has passed the shared
/// `data` wrapper precondition. These never leave the dispatcher: each one is
/// turned into an `Exception_*` quarantine entry.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Unexpected shape at {path}: expected {expected}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Tick count {0} is outside the representable date range")]
    TicksOutOfRange(i64),

    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransformError {
    /// Stable short code used in quarantine entry names.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::UnexpectedShape { .. } => "UnexpectedShape",
            TransformError::TicksOutOfRange(_) => "TicksOutOfRange",
            TransformError::Encode(_) => "Encode",
        }
    }

    pub(crate) fn shape(
        path: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        TransformError::UnexpectedShape {
            path: path.into(),
            expected,
            found: json_kind(found),
        }
    }
}

/// Human-readable name of a JSON node's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_error_reports_path_and_kinds() {
        let err = TransformError::shape("data[2]", "object", &json!("oops"));
        assert_eq!(err.code(), "UnexpectedShape");
        assert_eq!(
            err.to_string(),
            "Unexpected shape at data[2]: expected object, found string"
        );
    }

    #[test]
    fn codes_are_distinct() {
        let ticks = TransformError::TicksOutOfRange(-1);
        let shape = TransformError::shape("x", "object", &json!(1));
        assert_ne!(ticks.code(), shape.code());
    }
}
