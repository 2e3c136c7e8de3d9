//! Error types for document loading and storing

use std::path::PathBuf;

use thiserror::Error;

use crate::object::ObjectKind;

/// Main error type for jcontainers operations.
///
/// Only the text/file boundary produces errors. Lookups that miss, references
/// that cannot be resolved and unknown form strings are ordinary results
/// (`None`/`false`) and never surface here.
#[derive(Error, Debug)]
pub enum JcError {
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Text was not valid JSON, or a tree could not be printed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its root is a scalar
    #[error("Document root must be an array or object, got {0}")]
    NotAContainer(&'static str),

    /// A container of a different kind was expected
    #[error("Type error: expected {expected}, got {got}")]
    UnexpectedKind {
        /// Expected container kind
        expected: ObjectKind,
        /// Actual container kind
        got: ObjectKind,
    },

    /// Printed output was not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for jcontainers operations
pub type Result<T> = std::result::Result<T, JcError>;

/// Get a short name for the shape of a generic JSON value.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
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
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn test_error_messages() {
        let err = JcError::NotAContainer("number");
        assert_eq!(
            err.to_string(),
            "Document root must be an array or object, got number"
        );

        let err = JcError::UnexpectedKind {
            expected: ObjectKind::Map,
            got: ObjectKind::Array,
        };
        assert_eq!(err.to_string(), "Type error: expected map, got array");
    }
}
