//! Preparing a confirmed mapping for handoff to a tool.

use std::collections::BTreeSet;

use fireems_ingest::CsvTable;
use fireems_map::MappingSet;
use fireems_model::{FieldMapping, Record, TargetField, ValidationResult, Value};
use fireems_transform::{
    DateTimePatternResult, DateTimePlan, DateTimeTargets, RecordTransformer,
    detect_datetime_pattern, plan_datetime_mappings, validate_with_samples,
};
use tracing::{debug, info};

use crate::logging::redact_value;

/// Everything needed to transform an upload, plus how it was derived.
#[derive(Debug, Clone)]
pub struct Handoff {
    pub transformer: RecordTransformer,
    pub validation: ValidationResult,
    /// Detected layout; `None` when datetime planning was turned off.
    pub pattern: Option<DateTimePatternResult>,
    /// Target fields filled from the detected layout rather than the mapping.
    pub planned_targets: Vec<String>,
}

/// Detects the date/time layout of an upload, logging the sample values it used.
pub fn detect_layout(table: &CsvTable) -> DateTimePatternResult {
    let sample = table.sample_row();
    let pattern = detect_datetime_pattern(&table.headers, &sample);
    for column in [
        &pattern.date_field,
        &pattern.time_field,
        &pattern.combined_field,
    ]
    .into_iter()
    .flatten()
    {
        let value = sample.get(column).map(Value::as_text).unwrap_or_default();
        debug!(column = %column, value = redact_value(&value), "datetime column sample");
    }
    if pattern.is_detected() {
        info!(
            kind = ?pattern.kind,
            confidence = pattern.confidence,
            "detected datetime layout"
        );
    } else {
        info!(confidence = pattern.confidence, "no datetime layout detected");
    }
    pattern
}

/// Keeps only the parts of a datetime plan whose targets the mapping leaves open.
pub fn fill_datetime_gaps(mappings: &MappingSet, plan: DateTimePlan) -> DateTimePlan {
    let mut planned_targets = BTreeSet::new();
    let mappings_out: Vec<FieldMapping> = plan
        .mappings
        .into_iter()
        .filter(|mapping| !mappings.contains_target(&mapping.target_field))
        .filter(|mapping| planned_targets.insert(mapping.target_field.clone()))
        .collect();
    let merges = plan
        .merges
        .into_iter()
        .filter(|merge| {
            !mappings.contains_target(&merge.target_field)
                && !planned_targets.contains(&merge.target_field)
        })
        .collect();
    DateTimePlan {
        mappings: mappings_out,
        merges,
    }
}

/// Validates a mapping together with a datetime plan.
///
/// Planned mappings are checked like user mappings. A field fed by a merge
/// counts as mapped, so it is not reported as a missing required field.
pub fn validate_handoff(
    mappings: &MappingSet,
    plan: &DateTimePlan,
    fields: &[TargetField],
    samples: &[Record],
) -> ValidationResult {
    let merged: BTreeSet<&str> = plan
        .merges
        .iter()
        .map(|merge| merge.target_field.as_str())
        .collect();
    let fields: Vec<TargetField> = fields
        .iter()
        .map(|field| {
            let mut field = field.clone();
            if merged.contains(field.id.as_str()) {
                field.required = false;
            }
            field
        })
        .collect();
    let effective: Vec<FieldMapping> = mappings
        .iter()
        .chain(&plan.mappings)
        .cloned()
        .collect();
    validate_with_samples(&effective, &fields, samples)
}

/// Combines a confirmed mapping with the detected date/time layout and
/// validates the result against the tool's fields.
pub fn prepare_handoff(
    mappings: Vec<FieldMapping>,
    fields: &[TargetField],
    table: &CsvTable,
    use_datetime_plan: bool,
) -> Handoff {
    let mappings = MappingSet::from_vec(mappings);
    let records = table.records();

    let (pattern, plan) = if use_datetime_plan {
        let pattern = detect_layout(table);
        let plan = if pattern.is_detected() {
            let plan = plan_datetime_mappings(&pattern, &DateTimeTargets::from_fields(fields));
            fill_datetime_gaps(&mappings, plan)
        } else {
            DateTimePlan::default()
        };
        (Some(pattern), plan)
    } else {
        (None, DateTimePlan::default())
    };

    let validation = validate_handoff(&mappings, &plan, fields, &records);
    let planned_targets = plan
        .mappings
        .iter()
        .map(|mapping| mapping.target_field.clone())
        .chain(plan.merges.iter().map(|merge| merge.target_field.clone()))
        .collect();
    let transformer = RecordTransformer::new(mappings.into_vec()).with_plan(plan);

    Handoff {
        transformer,
        validation,
        pattern,
        planned_targets,
    }
}
