//! Error types for mapping operations.

use thiserror::Error;

/// Errors from editing a mapping session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Column not present in the uploaded source data.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// Field id not present in the target tool schema.
    #[error("Target field not found: {0}")]
    FieldNotFound(String),
    /// The suggester proposed no target for this column.
    #[error("No suggestion available for column '{0}'")]
    NoSuggestion(String),
    /// Template was saved for another tool.
    #[error("Template targets '{found}' but the session targets '{expected}'")]
    ToolMismatch { expected: String, found: String },
}
