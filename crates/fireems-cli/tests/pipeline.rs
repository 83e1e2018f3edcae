//! Integration tests for the handoff pipeline.

use fireems_cli::pipeline::{fill_datetime_gaps, prepare_handoff};
use fireems_ingest::read_csv_reader;
use fireems_map::MappingSet;
use fireems_model::{FieldMapping, FieldType, TargetField, TransformOp, Value};
use fireems_transform::{DateTimeMerge, DateTimePatternKind, DateTimePlan};

fn fields() -> Vec<TargetField> {
    vec![
        TargetField::new("incident_id", "Incident ID", FieldType::String)
            .unwrap()
            .required(),
        TargetField::new("incident_date", "Incident Date", FieldType::Date).unwrap(),
        TargetField::new("incident_time", "Incident Time", FieldType::Time).unwrap(),
        TargetField::new("incident_datetime", "Incident Date/Time", FieldType::DateTime)
            .unwrap()
            .required(),
    ]
}

const SPLIT_EXPORT: &str = "Incident Number,Date,Time\n\
                            24-0001,01/15/2024,08:30\n\
                            24-0002,01/16/2024,bad\n";

#[test]
fn separate_columns_fill_date_time_and_merged_fields() {
    let table = read_csv_reader(SPLIT_EXPORT.as_bytes()).unwrap();
    let mappings = vec![FieldMapping::new("Incident Number", "incident_id")];

    let handoff = prepare_handoff(mappings, &fields(), &table, true);

    let pattern = handoff.pattern.as_ref().unwrap();
    assert_eq!(pattern.kind, DateTimePatternKind::Simple);
    assert_eq!(
        handoff.planned_targets,
        vec!["incident_date", "incident_time", "incident_datetime"]
    );
    assert!(handoff.validation.is_valid, "{:?}", handoff.validation.errors);

    let output = handoff.transformer.transform(&table.records());
    assert_eq!(output.metadata.total, 2);
    assert_eq!(output.metadata.successful, 1);
    assert_eq!(output.metadata.skipped, 1);
    assert_eq!(output.errors[0].index, 1);
    assert_eq!(output.errors[0].source_field, "Time");

    let record = &output.records[0];
    assert_eq!(record.get("incident_id"), Some(&Value::from("24-0001")));
    assert!(matches!(record.get("incident_date"), Some(Value::Date(_))));
    assert!(matches!(record.get("incident_time"), Some(Value::Time(_))));
    assert!(matches!(record.get("incident_datetime"), Some(Value::DateTime(_))));
}

#[test]
fn without_planning_the_datetime_field_stays_missing() {
    let table = read_csv_reader(SPLIT_EXPORT.as_bytes()).unwrap();
    let mappings = vec![FieldMapping::new("Incident Number", "incident_id")];

    let handoff = prepare_handoff(mappings, &fields(), &table, false);

    assert!(handoff.pattern.is_none());
    assert!(handoff.planned_targets.is_empty());
    assert!(!handoff.validation.is_valid);
    assert_eq!(
        handoff.validation.errors,
        vec!["Required field 'Incident Date/Time' is not mapped"]
    );
}

#[test]
fn undetected_layout_plans_nothing() {
    let table = read_csv_reader("Incident Number,Notes\n24-0001,smoke\n".as_bytes()).unwrap();
    let mappings = vec![FieldMapping::new("Incident Number", "incident_id")];

    let handoff = prepare_handoff(mappings, &fields(), &table, true);

    assert!(!handoff.pattern.as_ref().unwrap().is_detected());
    assert!(handoff.planned_targets.is_empty());
    assert_eq!(
        handoff.validation.errors,
        vec!["Required field 'Incident Date/Time' is not mapped"]
    );
}

#[test]
fn user_mappings_win_over_the_plan() {
    let user = MappingSet::from_vec(vec![
        FieldMapping::new("Received", "incident_date").with_transform(TransformOp::ParseDate),
        FieldMapping::new("Stamp", "incident_datetime"),
    ]);
    let plan = DateTimePlan {
        mappings: vec![
            FieldMapping::new("Date", "incident_date").with_transform(TransformOp::ParseDate),
            FieldMapping::new("Time", "incident_time").with_transform(TransformOp::ParseTime),
        ],
        merges: vec![DateTimeMerge {
            date_field: "Date".to_string(),
            time_field: "Time".to_string(),
            target_field: "incident_datetime".to_string(),
        }],
    };

    let filled = fill_datetime_gaps(&user, plan);

    assert_eq!(
        filled.mappings,
        vec![FieldMapping::new("Time", "incident_time").with_transform(TransformOp::ParseTime)]
    );
    assert!(filled.merges.is_empty());
}
