use fireems_model::{Record, Value};
use fireems_transform::{DateTimePatternKind, detect_datetime_pattern};

fn upload(pairs: &[(&str, &str)]) -> (Vec<String>, Record) {
    let columns = pairs.iter().map(|(name, _)| (*name).to_string()).collect();
    let sample = pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), Value::from_cell(value)))
        .collect();
    (columns, sample)
}

#[test]
fn cad_combined_export() {
    let (columns, sample) = upload(&[
        ("Incident Number", "24-000123"),
        ("CallDateTime", "01/15/2024 08:30:45"),
        ("Unit", "E12"),
    ]);
    let result = detect_datetime_pattern(&columns, &sample);
    assert_eq!(result.kind, DateTimePatternKind::Combined);
    assert!(result.is_detected());
    assert!(result.confidence > 0.7);
    assert_eq!(result.combined_field.as_deref(), Some("CallDateTime"));

    insta::assert_snapshot!(
        serde_json::to_string(&result).unwrap(),
        @r#"{"type":"combined","confidence":0.8,"combinedField":"CallDateTime","description":"Combined date/time field 'CallDateTime'"}"#
    );
}

#[test]
fn volunteer_simple_export() {
    let (columns, sample) = upload(&[
        ("Date", "01/15/2024"),
        ("Time", "08:30"),
        ("Address", "12 Main St"),
    ]);
    let result = detect_datetime_pattern(&columns, &sample);
    assert_eq!(result.kind, DateTimePatternKind::Simple);
    assert!(result.confidence > 0.5);
    assert_eq!(result.date_field.as_deref(), Some("Date"));
    assert_eq!(result.time_field.as_deref(), Some("Time"));
}

#[test]
fn strategies_do_not_cross_fire() {
    // A combined export has no plain date/time columns.
    let (columns, sample) = upload(&[("CallDateTime", "01/15/2024 08:30:45")]);
    assert_ne!(
        detect_datetime_pattern(&columns, &sample).kind,
        DateTimePatternKind::Simple
    );

    // A simple export has no combined column name or value.
    let (columns, sample) = upload(&[("Date", "01/15/2024"), ("Time", "08:30")]);
    assert_ne!(
        detect_datetime_pattern(&columns, &sample).kind,
        DateTimePatternKind::Combined
    );
}

#[test]
fn iso_values_and_received_time_names() {
    let (columns, sample) = upload(&[("Call Received Date/Time", "2024-01-15 08:30:45")]);
    let result = detect_datetime_pattern(&columns, &sample);
    assert_eq!(result.kind, DateTimePatternKind::Combined);
    assert_eq!(result.combined_field.as_deref(), Some("Call Received Date/Time"));
}

#[test]
fn name_without_valid_value_is_unknown() {
    let (columns, sample) = upload(&[("Call Time", "soon")]);
    let result = detect_datetime_pattern(&columns, &sample);
    assert_eq!(result.kind, DateTimePatternKind::Unknown);
    assert!(!result.is_detected());
    assert!((result.confidence - 0.4).abs() < f64::EPSILON);
    assert!(result.combined_field.is_none());
}

#[test]
fn no_columns_is_unknown() {
    let result = detect_datetime_pattern(&[], &Record::new());
    assert_eq!(result.kind, DateTimePatternKind::Unknown);
    assert_eq!(result.confidence, 0.0);
}
