//! Mapping validation against a target tool schema.

use std::collections::BTreeSet;

use fireems_model::{FieldMapping, TargetField, ValidationResult};
use tracing::debug;

use crate::engine::MappingEngine;

/// Re-derived suggestions scoring below this are reported as warnings.
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 70;

/// Validates a confirmed mapping list.
///
/// Errors, which make the result invalid, are only reported for required
/// fields without a mapping targeting their id.
///
/// Warnings:
/// - the suggester is re-run over the source column of every mapping and each
///   suggestion whose best candidate scores below [`LOW_CONFIDENCE_THRESHOLD`]
///   is reported. The candidate is re-derived from the column name, so the
///   warning names the field the suggester would pick, which is not
///   necessarily the field the user chose.
/// - every target id that is not part of the schema, once per id.
pub fn validate_mapping(mappings: &[FieldMapping], target_fields: &[TargetField]) -> ValidationResult {
    let errors = required_field_errors(mappings, target_fields);
    let mut warnings = low_confidence_warnings(mappings, target_fields);
    warnings.extend(unknown_target_warnings(mappings, target_fields));

    debug!(
        mappings = mappings.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "validated mapping"
    );
    ValidationResult::new(errors, warnings)
}

fn required_field_errors(mappings: &[FieldMapping], target_fields: &[TargetField]) -> Vec<String> {
    target_fields
        .iter()
        .filter(|field| field.required)
        .filter(|field| !mappings.iter().any(|m| m.target_field == field.id))
        .map(|field| format!("Required field '{}' is not mapped", field.name))
        .collect()
}

fn unknown_target_warnings(
    mappings: &[FieldMapping],
    target_fields: &[TargetField],
) -> Vec<String> {
    let known: BTreeSet<&str> = target_fields.iter().map(|f| f.id.as_str()).collect();
    let mut reported = BTreeSet::new();
    mappings
        .iter()
        .map(|m| m.target_field.as_str())
        .filter(|id| !known.contains(id) && reported.insert(*id))
        .map(|id| format!("Unknown target field '{id}'"))
        .collect()
}

fn low_confidence_warnings(mappings: &[FieldMapping], target_fields: &[TargetField]) -> Vec<String> {
    let sources: Vec<&str> = mappings.iter().map(|m| m.source_field.as_str()).collect();

    // No floor here: a floor of 70 would null every candidate under the bar.
    let engine = MappingEngine::new(target_fields.to_vec(), 0);
    engine
        .suggest(&sources)
        .suggestions
        .into_iter()
        .filter(|s| s.confidence < LOW_CONFIDENCE_THRESHOLD)
        .filter_map(|s| {
            let field = s.target_field?;
            Some(format!(
                "Low confidence mapping: {} → {}",
                s.source_field, field.name
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fireems_model::FieldType;

    #[test]
    fn unknown_targets_warn_once() {
        let fields = vec![TargetField::new("latitude", "Latitude", FieldType::Number).unwrap()];
        let mappings = vec![
            FieldMapping::new("Latitude", "latitude"),
            FieldMapping::new("Foo", "foo"),
            FieldMapping::new("Bar", "foo"),
        ];
        let result = validate_mapping(&mappings, &fields);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        let unknown: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.starts_with("Unknown target field"))
            .collect();
        assert_eq!(unknown, vec!["Unknown target field 'foo'"]);
    }

    #[test]
    fn empty_mapping_against_optional_schema_is_valid() {
        let fields = vec![TargetField::new("notes", "Notes", FieldType::String).unwrap()];
        let result = validate_mapping(&[], &fields);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }
}
