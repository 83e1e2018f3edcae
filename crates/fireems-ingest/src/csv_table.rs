use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use fireems_model::{Record, Value};
use tracing::debug;

/// A CSV export as headers plus string rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Rows as records keyed by header; blank cells become `Null`.
    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.to_record(row)).collect()
    }

    /// First data row, used for datetime detection and type checks.
    pub fn sample_row(&self) -> Record {
        self.rows
            .first()
            .map(|row| self.to_record(row))
            .unwrap_or_default()
    }

    /// Non-blank values of one column.
    pub fn column_values(&self, header: &str) -> Vec<&str> {
        let Some(index) = self.headers.iter().position(|h| h == header) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .collect()
    }

    fn to_record(&self, row: &[String]) -> Record {
        self.headers
            .iter()
            .zip(row)
            .map(|(header, cell)| (header.clone(), Value::from_cell(cell)))
            .collect()
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

/// Blank headers get a positional name; repeats get a ` (n)` suffix.
fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .enumerate()
        .map(|(idx, value)| {
            let base = match normalize_header(value) {
                header if header.is_empty() => format!("Column {}", idx + 1),
                header => header,
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base} ({n})");
                n += 1;
            }
            candidate
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    total: usize,
    non_empty: usize,
    numeric: usize,
    alpha: usize,
}

impl RowStats {
    fn ratio(self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

fn row_stats(row: &[String]) -> RowStats {
    let mut stats = RowStats {
        total: row.len(),
        ..RowStats::default()
    };
    for cell in row.iter().map(|cell| cell.trim()).filter(|cell| !cell.is_empty()) {
        stats.non_empty += 1;
        if cell.parse::<f64>().is_ok() {
            stats.numeric += 1;
        }
        if cell.chars().any(|ch| ch.is_ascii_alphabetic()) {
            stats.alpha += 1;
        }
    }
    stats
}

fn is_header_like(stats: RowStats, widest: usize) -> bool {
    stats.non_empty * 2 >= widest
        && stats.ratio(stats.alpha) >= 0.5
        && stats.ratio(stats.numeric) <= 0.1
}

/// Skips banner rows some CAD systems print above the real header.
fn detect_header_row(rows: &[Vec<String>]) -> usize {
    let probe = rows.len().min(5);
    let stats: Vec<RowStats> = rows.iter().take(probe).map(|row| row_stats(row)).collect();
    let widest = stats.iter().map(|s| s.non_empty).max().unwrap_or(0);
    stats
        .iter()
        .position(|stat| is_header_like(*stat, widest))
        .unwrap_or(0)
}

/// Reads a CSV file.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let file = std::fs::File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    read_csv_reader(file).with_context(|| format!("read csv: {}", path.display()))
}

/// Reads CSV text from any reader.
pub fn read_csv_reader<R: Read>(source: R) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", line + 1))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(CsvTable::default());
    }

    let header_index = detect_header_row(&raw_rows);
    let headers = unique_headers(&raw_rows[header_index]);
    let rows: Vec<Vec<String>> = raw_rows
        .iter()
        .skip(header_index + 1)
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    debug!(
        header_row = header_index,
        columns = headers.len(),
        rows = rows.len(),
        "read csv table"
    );
    Ok(CsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn banner_row_is_skipped() {
        let rows = vec![
            row(&["Metro CAD Export", "", "", ""]),
            row(&["Incident Number", "CallDateTime", "Unit", "Lat"]),
            row(&["24-0001", "01/15/2024 08:30:45", "E12", "44.9"]),
        ];
        assert_eq!(detect_header_row(&rows), 1);
    }

    #[test]
    fn first_row_wins_when_nothing_looks_like_a_header() {
        let rows = vec![row(&["1", "2"]), row(&["3", "4"])];
        assert_eq!(detect_header_row(&rows), 0);
    }

    #[test]
    fn headers_are_made_unique() {
        let headers = unique_headers(&row(&[" Unit ", "", "Unit", "Unit"]));
        assert_eq!(headers, vec!["Unit", "Column 2", "Unit (2)", "Unit (3)"]);
    }
}
