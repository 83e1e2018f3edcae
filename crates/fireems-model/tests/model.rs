//! Tests for fireems-model types.

use fireems_model::{
    FieldMapping, FieldType, MappingSuggestion, MappingTemplate, TargetField, TransformOp,
    ValidationResult,
};

#[test]
fn field_mapping_round_trip() {
    let mappings = vec![
        FieldMapping::new("Call Received", "incident_date")
            .with_transform(TransformOp::Trim)
            .with_transform(TransformOp::ExtractDate),
        FieldMapping::new("Call Received", "incident_time")
            .with_transform(TransformOp::ExtractTime),
        FieldMapping::new("Unit", "unit"),
        FieldMapping::new("Turnout (min)", "turnout_seconds")
            .with_transform(TransformOp::ParseNumber)
            .with_transform(TransformOp::Scale { factor: 60.0 }),
    ];

    let json = serde_json::to_string(&mappings).expect("serialize mappings");
    let round: Vec<FieldMapping> = serde_json::from_str(&json).expect("deserialize mappings");
    assert_eq!(round, mappings);
}

#[test]
fn field_mapping_uses_camel_case_keys() {
    let json = serde_json::to_value(FieldMapping::new("Inc #", "incident_id")).unwrap();
    assert_eq!(json["sourceField"], "Inc #");
    assert_eq!(json["targetField"], "incident_id");
    assert!(json.get("transformations").is_none());
}

#[test]
fn transformations_default_when_absent() {
    let mapping: FieldMapping =
        serde_json::from_str(r#"{"sourceField":"Lat","targetField":"latitude"}"#).unwrap();
    assert!(mapping.transformations.is_empty());

    let mapping: FieldMapping = serde_json::from_str(
        r#"{"sourceField":"When","targetField":"incident_date","transformations":[{"op":"format_date","format":"%m/%d/%Y"}]}"#,
    )
    .unwrap();
    assert_eq!(
        mapping.transformations,
        vec![TransformOp::FormatDate {
            format: "%m/%d/%Y".to_string()
        }]
    );
}

#[test]
fn template_round_trip() {
    let template = MappingTemplate::new(
        "County CAD export",
        "response-time-analyzer",
        vec![FieldMapping::new("Incident Number", "incident_id")],
    );
    let json = serde_json::to_string_pretty(&template).expect("serialize template");
    assert!(json.contains("\"targetToolId\""));
    let round: MappingTemplate = serde_json::from_str(&json).expect("deserialize template");
    assert_eq!(round, template);
}

#[test]
fn template_update_bumps_timestamp() {
    let mut template = MappingTemplate::new("t", "fire-map-pro", vec![]);
    let created = template.created_at;
    template.set_mappings(vec![FieldMapping::new("Lat", "latitude")]);
    assert_eq!(template.mappings.len(), 1);
    assert!(template.updated_at >= created);
    assert_eq!(template.created_at, created);
}

#[test]
fn validation_result_validity_follows_errors() {
    let ok = ValidationResult::new(vec![], vec!["Low confidence mapping: a → b".to_string()]);
    assert!(ok.is_valid);
    assert_eq!(ok.warning_count(), 1);

    let bad = ValidationResult::new(vec!["Required field 'X' is not mapped".to_string()], vec![]);
    assert!(!bad.is_valid);
    assert_eq!(bad.error_count(), 1);
}

#[test]
fn suggestion_converts_to_mapping() {
    let field = TargetField::new("latitude", "Latitude", FieldType::Number)
        .unwrap()
        .required();
    let suggestion = MappingSuggestion {
        source_field: "LAT".to_string(),
        target_field: Some(field),
        confidence: 100,
        reasons: vec!["Exact match found".to_string()],
    };
    assert_eq!(
        suggestion.to_mapping(),
        Some(FieldMapping::new("LAT", "latitude"))
    );

    let unmatched = MappingSuggestion {
        target_field: None,
        ..suggestion
    };
    assert_eq!(unmatched.to_mapping(), None);
}
