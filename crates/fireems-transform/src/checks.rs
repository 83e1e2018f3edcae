//! Sample-based type checks on top of mapping validation.

use fireems_map::validate_mapping;
use fireems_model::{FieldMapping, FieldType, Record, TargetField, TransformOp, ValidationResult, Value};

use crate::executors::{apply_op, apply_ops};

/// Validates a mapping and also checks that sample values fit their target type.
///
/// For each mapping the first non-blank sample value of its source column is
/// run through the mapping's transforms. A value that fails to transform, or
/// that cannot be read as the target field's type, adds a warning. Warnings
/// never change validity.
pub fn validate_with_samples(
    mappings: &[FieldMapping],
    target_fields: &[TargetField],
    samples: &[Record],
) -> ValidationResult {
    let base = validate_mapping(mappings, target_fields);
    let mut warnings = base.warnings;

    for mapping in mappings {
        let Some(field) = target_fields.iter().find(|f| f.id == mapping.target_field) else {
            continue;
        };
        let Some(sample) = samples
            .iter()
            .filter_map(|record| record.get(&mapping.source_field))
            .find(|value| !value.is_blank())
        else {
            continue;
        };

        let fits = apply_ops(&mapping.transformations, sample.clone())
            .is_ok_and(|value| looks_like(&value, field.field_type));
        if !fits {
            warnings.push(format!(
                "Sample value for '{}' does not look like {}",
                mapping.source_field, field.field_type
            ));
        }
    }

    ValidationResult::new(base.errors, warnings)
}

/// Whether a value is, or parses as, the given field type.
pub fn looks_like(value: &Value, field_type: FieldType) -> bool {
    let parses_as = |op: TransformOp, expected: fn(&Value) -> bool| {
        apply_op(&op, value.clone()).is_ok_and(|parsed| expected(&parsed))
    };
    match field_type {
        FieldType::String => true,
        FieldType::Number => parses_as(TransformOp::ParseNumber, |v| matches!(v, Value::Number(_))),
        FieldType::Boolean => parses_as(TransformOp::ParseBoolean, |v| matches!(v, Value::Boolean(_))),
        FieldType::Date => match value {
            Value::Date(_) => true,
            Value::Text(_) => parses_as(TransformOp::ParseDate, |v| matches!(v, Value::Date(_))),
            _ => false,
        },
        FieldType::Time => match value {
            Value::Time(_) => true,
            Value::Text(_) => parses_as(TransformOp::ParseTime, |v| matches!(v, Value::Time(_))),
            _ => false,
        },
        FieldType::DateTime => {
            parses_as(TransformOp::ParseDateTime, |v| matches!(v, Value::DateTime(_)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_like_by_type() {
        let text = |s: &str| Value::Text(s.to_string());
        assert!(looks_like(&text("12.5"), FieldType::Number));
        assert!(!looks_like(&text("E12"), FieldType::Number));
        assert!(looks_like(&text("01/15/2024"), FieldType::Date));
        assert!(!looks_like(&text("01/15/2024 08:30:45"), FieldType::Date));
        assert!(looks_like(&text("01/15/2024 08:30:45"), FieldType::DateTime));
        assert!(looks_like(&text("08:30"), FieldType::Time));
        assert!(looks_like(&text("anything"), FieldType::String));
        assert!(looks_like(&text("Y"), FieldType::Boolean));
    }
}
