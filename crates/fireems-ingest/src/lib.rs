#![deny(unsafe_code)]

//! Loading uploaded CAD exports.

mod csv_table;

pub use csv_table::{CsvTable, read_csv_reader, read_csv_table};
