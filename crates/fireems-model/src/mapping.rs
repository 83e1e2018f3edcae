//! Mapping types exchanged between the engine and its callers.

use serde::{Deserialize, Serialize};

use crate::field::TargetField;

/// A single value transformation applied while handing records to a tool.
///
/// Ops run in list order; each takes one value and returns one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    /// Strip leading/trailing whitespace from text.
    Trim,
    Uppercase,
    Lowercase,
    /// Date part of a datetime (or date-like text).
    ExtractDate,
    /// Time part of a datetime (or time-like text).
    ExtractTime,
    ParseDate,
    ParseTime,
    ParseDateTime,
    ParseNumber,
    ParseBoolean,
    /// Multiply a numeric value, e.g. minutes to seconds.
    Scale { factor: f64 },
    /// Render a date/datetime with a chrono format string.
    FormatDate { format: String },
}

impl TransformOp {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Trim => "Trim",
            Self::Uppercase => "Uppercase",
            Self::Lowercase => "Lowercase",
            Self::ExtractDate => "Extract Date",
            Self::ExtractTime => "Extract Time",
            Self::ParseDate => "Parse Date",
            Self::ParseTime => "Parse Time",
            Self::ParseDateTime => "Parse DateTime",
            Self::ParseNumber => "Parse Number",
            Self::ParseBoolean => "Parse Boolean",
            Self::Scale { .. } => "Scale",
            Self::FormatDate { .. } => "Format Date",
        }
    }
}

/// A confirmed source-column-to-target-field pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    /// Target field id.
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<TransformOp>,
}

impl FieldMapping {
    pub fn new(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.into(),
            transformations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, op: TransformOp) -> Self {
        self.transformations.push(op);
        self
    }
}

/// Result of comparing two names, 0 (unrelated) to 100 (identical).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub score: u8,
    pub reasons: Vec<String>,
}

impl SimilarityResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(score: u8, reason: impl Into<String>) -> Self {
        Self {
            score,
            reasons: vec![reason.into()],
        }
    }
}

/// The engine's best guess for one source column.
///
/// `target_field` is `None` when nothing cleared the confidence floor; in that
/// case `confidence` still carries the best score that was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub source_field: String,
    pub target_field: Option<TargetField>,
    pub confidence: u8,
    pub reasons: Vec<String>,
}

impl MappingSuggestion {
    /// Converts an accepted suggestion into a mapping entry.
    pub fn to_mapping(&self) -> Option<FieldMapping> {
        self.target_field
            .as_ref()
            .map(|field| FieldMapping::new(self.source_field.clone(), field.id.clone()))
    }
}

/// Outcome of checking a mapping set against a tool schema.
///
/// `is_valid` is true exactly when `errors` is empty. Warnings are advisory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
