use std::fs;

use fireems_ingest::{read_csv_reader, read_csv_table};
use fireems_model::Value;

#[test]
fn reads_cad_export_with_banner() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("export.csv");
    fs::write(
        &path,
        "\u{feff}Metro CAD Export\n\
         Incident Number,CallDateTime,Unit,Lat\n\
         24-0001,01/15/2024 08:30:45,E12,44.95\n\
         24-0002,01/15/2024 09:02:10,,\n",
    )
    .expect("write csv");

    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["Incident Number", "CallDateTime", "Unit", "Lat"]);
    assert_eq!(table.rows.len(), 2);

    let sample = table.sample_row();
    assert_eq!(sample.get("Unit"), Some(&Value::from("E12")));

    let records = table.records();
    assert_eq!(records[1].get("Unit"), Some(&Value::Null));
    assert_eq!(records[1].get("Lat"), Some(&Value::Null));
    assert_eq!(table.column_values("Unit"), vec!["E12"]);
}

#[test]
fn short_rows_are_padded() {
    let table = read_csv_reader("Date,Time,Unit\n01/15/2024,08:30\n".as_bytes()).unwrap();
    assert_eq!(table.rows, vec![vec!["01/15/2024", "08:30", ""]]);
    assert_eq!(table.sample_row().get("Unit"), Some(&Value::Null));
}

#[test]
fn empty_input() {
    let table = read_csv_reader("\n\n".as_bytes()).unwrap();
    assert!(table.headers.is_empty());
    assert!(table.sample_row().is_empty());
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_csv_table(&dir.path().join("nope.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
}
