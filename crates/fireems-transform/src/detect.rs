//! Detection of how an export represents incident date and time.
//!
//! CAD vendors either emit one combined call-datetime column or separate plain
//! `Date` and `Time` columns. Strategies run in a fixed order and the first one
//! that clears its own threshold decides the result. Confidence is accumulated
//! in tenths so threshold comparisons are exact.

use std::sync::LazyLock;

use fireems_map::normalize_name;
use fireems_model::Record;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Column name patterns for combined datetime columns, in priority order.
static COMBINED_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^calldatetime$",
        r"(?i)^call_datetime$",
        r"(?i)^incident_datetime$",
        r"(?i)^event_datetime$",
        r"(?i)^call_received_date/time$",
        r"(?i)^.*call.*time.*$",
        r"(?i)^.*received.*time.*$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid combined column regex"))
    .collect()
});

/// `MM/DD/YYYY HH:MM` prefix used to sniff unnamed combined columns.
static DATETIME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}").expect("Invalid datetime prefix regex")
});

/// Complete combined values: US layout with optional seconds and AM/PM, or ISO.
static FULL_DATETIME: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}\s+\d{1,2}:\d{2}(:\d{2})?(\s*[AaPp][Mm])?$")
            .expect("Invalid US datetime regex"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}$").expect("Invalid ISO datetime regex"),
    ]
});

const COMBINED_NAME_TENTHS: u8 = 4;
const COMBINED_CONTENT_TENTHS: u8 = 3;
const COMBINED_FORMAT_TENTHS: u8 = 4;
const COMBINED_THRESHOLD_TENTHS: u8 = 7;

const SIMPLE_NAME_TENTHS: u8 = 4;
const SIMPLE_SAMPLE_TENTHS: u8 = 3;
const SIMPLE_THRESHOLD_TENTHS: u8 = 5;

/// How the export carries date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateTimePatternKind {
    /// Separate date and time columns.
    Simple,
    /// One column holding both.
    Combined,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimePatternResult {
    #[serde(rename = "type")]
    pub kind: DateTimePatternKind,
    /// 0.0 to 1.0.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_field: Option<String>,
    pub description: String,
}

impl DateTimePatternResult {
    fn unknown(tenths: u8) -> Self {
        Self {
            kind: DateTimePatternKind::Unknown,
            confidence: f64::from(tenths) / 10.0,
            date_field: None,
            time_field: None,
            combined_field: None,
            description: "No date/time pattern detected with sufficient confidence".to_string(),
        }
    }

    pub fn is_detected(&self) -> bool {
        self.kind != DateTimePatternKind::Unknown
    }
}

/// What a strategy found, before its threshold is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: DateTimePatternKind,
    pub tenths: u8,
    pub date_field: Option<String>,
    pub time_field: Option<String>,
    pub combined_field: Option<String>,
    pub description: String,
}

impl Candidate {
    fn into_result(self) -> DateTimePatternResult {
        DateTimePatternResult {
            kind: self.kind,
            confidence: f64::from(self.tenths) / 10.0,
            date_field: self.date_field,
            time_field: self.time_field,
            combined_field: self.combined_field,
            description: self.description,
        }
    }
}

/// One vendor convention for carrying date and time.
pub trait DetectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidates must score strictly above this, in tenths.
    fn threshold_tenths(&self) -> u8;

    fn detect(&self, columns: &[String], sample: &Record) -> Candidate;
}

fn sample_text(sample: &Record, column: &str) -> String {
    sample
        .get(column)
        .map(|value| value.as_text().trim().to_string())
        .unwrap_or_default()
}

/// Single combined call-datetime column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedFieldStrategy;

impl DetectionStrategy for CombinedFieldStrategy {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn threshold_tenths(&self) -> u8 {
        COMBINED_THRESHOLD_TENTHS
    }

    fn detect(&self, columns: &[String], sample: &Record) -> Candidate {
        let mut tenths = 0;
        let by_name = COMBINED_NAME_PATTERNS
            .iter()
            .find_map(|pattern| columns.iter().find(|column| pattern.is_match(column)));

        let field = match by_name {
            Some(column) => {
                tenths += COMBINED_NAME_TENTHS;
                Some(column)
            }
            None => {
                let sniffed = columns
                    .iter()
                    .find(|column| DATETIME_PREFIX.is_match(&sample_text(sample, column)));
                if sniffed.is_some() {
                    tenths += COMBINED_CONTENT_TENTHS;
                }
                sniffed
            }
        };

        if let Some(column) = field {
            let value = sample_text(sample, column);
            if FULL_DATETIME.iter().any(|pattern| pattern.is_match(&value)) {
                tenths += COMBINED_FORMAT_TENTHS;
            }
        }

        Candidate {
            kind: DateTimePatternKind::Combined,
            tenths,
            date_field: None,
            time_field: None,
            description: match field {
                Some(column) => format!("Combined date/time field '{column}'"),
                None => "No combined date/time field".to_string(),
            },
            combined_field: field.cloned(),
        }
    }
}

/// Plain `Date` and `Time` columns side by side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFieldStrategy;

impl DetectionStrategy for SimpleFieldStrategy {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn threshold_tenths(&self) -> u8 {
        SIMPLE_THRESHOLD_TENTHS
    }

    fn detect(&self, columns: &[String], sample: &Record) -> Candidate {
        let date = columns.iter().find(|column| normalize_name(column) == "date");
        let time = columns.iter().find(|column| normalize_name(column) == "time");

        let mut tenths = 0;
        if let (Some(date), Some(time)) = (date, time) {
            tenths += SIMPLE_NAME_TENTHS;
            if !sample_text(sample, date).is_empty() && !sample_text(sample, time).is_empty() {
                tenths += SIMPLE_SAMPLE_TENTHS;
            }
        }

        Candidate {
            kind: DateTimePatternKind::Simple,
            tenths,
            date_field: date.cloned(),
            time_field: time.cloned(),
            combined_field: None,
            description: "Separate date and time fields".to_string(),
        }
    }
}

/// Runs strategies in order; the first confident one wins.
pub struct DateTimeDetector {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl Default for DateTimeDetector {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(CombinedFieldStrategy), Box::new(SimpleFieldStrategy)],
        }
    }
}

impl DateTimeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy after the existing ones.
    pub fn with_strategy(mut self, strategy: impl DetectionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn detect(&self, columns: &[String], sample: &Record) -> DateTimePatternResult {
        let mut best = 0;
        for strategy in &self.strategies {
            let candidate = strategy.detect(columns, sample);
            debug!(
                strategy = strategy.name(),
                tenths = candidate.tenths,
                "datetime strategy evaluated"
            );
            if candidate.tenths > strategy.threshold_tenths() {
                return candidate.into_result();
            }
            best = best.max(candidate.tenths);
        }
        DateTimePatternResult::unknown(best)
    }
}

/// Detects the datetime layout with the built-in strategies.
pub fn detect_datetime_pattern(columns: &[String], sample: &Record) -> DateTimePatternResult {
    DateTimeDetector::new().detect(columns, sample)
}
