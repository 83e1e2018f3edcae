//! Transformation executor functions.
//!
//! Each [`TransformOp`] maps one [`Value`] to one [`Value`]. `Null` passes
//! through every op unchanged, and the parse ops turn blank text into `Null`.

use std::fmt::Write;

use fireems_model::{TransformOp, Value};
use thiserror::Error;

use crate::datetime::{parse_date, parse_datetime, parse_time};

/// A value that a transform could not handle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("cannot parse '{0}' as a date")]
    InvalidDate(String),
    #[error("cannot parse '{0}' as a time")]
    InvalidTime(String),
    #[error("cannot parse '{0}' as a date and time")]
    InvalidDateTime(String),
    #[error("cannot parse '{0}' as a number")]
    InvalidNumber(String),
    #[error("cannot parse '{0}' as a boolean")]
    InvalidBoolean(String),
    #[error("invalid date format '{0}'")]
    InvalidFormat(String),
    #[error("{op} cannot be applied to a {kind} value")]
    Unsupported { op: &'static str, kind: &'static str },
}

/// Runs a list of ops in order, stopping at the first failure.
pub fn apply_ops(ops: &[TransformOp], value: Value) -> Result<Value, TransformError> {
    ops.iter().try_fold(value, |value, op| apply_op(op, value))
}

/// Applies a single op.
pub fn apply_op(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match op {
        TransformOp::Trim => Ok(Value::Text(value.as_text().trim().to_string())),
        TransformOp::Uppercase => Ok(Value::Text(value.as_text().to_uppercase())),
        TransformOp::Lowercase => Ok(Value::Text(value.as_text().to_lowercase())),
        TransformOp::ExtractDate => extract_date(op, value),
        TransformOp::ExtractTime => extract_time(op, value),
        TransformOp::ParseDate => to_date(op, value),
        TransformOp::ParseTime => to_time(op, value),
        TransformOp::ParseDateTime => to_datetime(op, value),
        TransformOp::ParseNumber => to_number(op, value),
        TransformOp::ParseBoolean => to_boolean(op, value),
        TransformOp::Scale { factor } => match to_number(op, value)? {
            Value::Number(number) => Ok(Value::Number(number * factor)),
            other => Ok(other),
        },
        TransformOp::FormatDate { format } => format_temporal(op, value, format),
    }
}

fn unsupported(op: &TransformOp, value: &Value) -> TransformError {
    TransformError::Unsupported {
        op: op.display_name(),
        kind: value.kind(),
    }
}

fn extract_date(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::DateTime(datetime) => Ok(Value::Date(datetime.date())),
        Value::Date(_) => Ok(value),
        Value::Text(ref text) => parse_datetime(text)
            .map(|datetime| datetime.date())
            .or_else(|| parse_date(text))
            .map(Value::Date)
            .ok_or_else(|| TransformError::InvalidDateTime(text.clone())),
        other => Err(unsupported(op, &other)),
    }
}

fn extract_time(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::DateTime(datetime) => Ok(Value::Time(datetime.time())),
        Value::Time(_) => Ok(value),
        Value::Text(ref text) => parse_datetime(text)
            .map(|datetime| datetime.time())
            .or_else(|| parse_time(text))
            .map(Value::Time)
            .ok_or_else(|| TransformError::InvalidDateTime(text.clone())),
        other => Err(unsupported(op, &other)),
    }
}

fn to_date(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Date(_) => Ok(value),
        Value::DateTime(datetime) => Ok(Value::Date(datetime.date())),
        Value::Text(ref text) if text.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref text) => parse_date(text)
            .map(Value::Date)
            .ok_or_else(|| TransformError::InvalidDate(text.clone())),
        other => Err(unsupported(op, &other)),
    }
}

fn to_time(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Time(_) => Ok(value),
        Value::DateTime(datetime) => Ok(Value::Time(datetime.time())),
        Value::Text(ref text) if text.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref text) => parse_time(text)
            .map(Value::Time)
            .ok_or_else(|| TransformError::InvalidTime(text.clone())),
        other => Err(unsupported(op, &other)),
    }
}

fn to_datetime(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::DateTime(_) => Ok(value),
        Value::Text(ref text) if text.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref text) => parse_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| TransformError::InvalidDateTime(text.clone())),
        other => Err(unsupported(op, &other)),
    }
}

fn to_number(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Number(_) => Ok(value),
        Value::Text(ref text) if text.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref text) => {
            let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(Value::Number)
                .ok_or_else(|| TransformError::InvalidNumber(text.clone()))
        }
        other => Err(unsupported(op, &other)),
    }
}

fn to_boolean(op: &TransformOp, value: Value) -> Result<Value, TransformError> {
    match value {
        Value::Boolean(_) => Ok(value),
        Value::Number(number) if number == 1.0 => Ok(Value::Boolean(true)),
        Value::Number(number) if number == 0.0 => Ok(Value::Boolean(false)),
        Value::Text(ref text) if text.trim().is_empty() => Ok(Value::Null),
        Value::Text(ref text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(Value::Boolean(true)),
            "false" | "f" | "no" | "n" | "0" => Ok(Value::Boolean(false)),
            _ => Err(TransformError::InvalidBoolean(text.clone())),
        },
        Value::Number(number) => Err(TransformError::InvalidBoolean(number.to_string())),
        other => Err(unsupported(op, &other)),
    }
}

fn format_temporal(op: &TransformOp, value: Value, format: &str) -> Result<Value, TransformError> {
    let mut rendered = String::new();
    let written = match &value {
        Value::Date(date) => write!(rendered, "{}", date.format(format)),
        Value::Time(time) => write!(rendered, "{}", time.format(format)),
        Value::DateTime(datetime) => write!(rendered, "{}", datetime.format(format)),
        Value::Text(text) => {
            let parsed = match parse_datetime(text) {
                Some(datetime) => Value::DateTime(datetime),
                None => parse_date(text)
                    .map(Value::Date)
                    .ok_or_else(|| TransformError::InvalidDate(text.clone()))?,
            };
            return format_temporal(op, parsed, format);
        }
        other => return Err(unsupported(op, other)),
    };
    written.map_err(|_| TransformError::InvalidFormat(format.to_string()))?;
    Ok(Value::Text(rendered))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn text(value: &str) -> Value {
        Value::Text(value.to_string())
    }

    #[test]
    fn extract_parts_of_combined_text() {
        let stamp = text("01/15/2024 08:30:45");
        assert_eq!(
            apply_op(&TransformOp::ExtractDate, stamp.clone()),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
        assert_eq!(
            apply_op(&TransformOp::ExtractTime, stamp),
            Ok(Value::Time(NaiveTime::from_hms_opt(8, 30, 45).unwrap()))
        );
    }

    #[test]
    fn extract_falls_back_to_single_part() {
        assert_eq!(
            apply_op(&TransformOp::ExtractDate, text("2024-01-15")),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()))
        );
        assert_eq!(
            apply_op(&TransformOp::ExtractTime, text("08:30")),
            Ok(Value::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()))
        );
        assert_eq!(
            apply_op(&TransformOp::ExtractDate, text("yesterday")),
            Err(TransformError::InvalidDateTime("yesterday".to_string()))
        );
    }

    #[test]
    fn parse_ops_treat_blank_as_null() {
        for op in [
            TransformOp::ParseDate,
            TransformOp::ParseTime,
            TransformOp::ParseDateTime,
            TransformOp::ParseNumber,
            TransformOp::ParseBoolean,
        ] {
            assert_eq!(apply_op(&op, text("   ")), Ok(Value::Null), "{op:?}");
            assert_eq!(apply_op(&op, Value::Null), Ok(Value::Null), "{op:?}");
        }
    }

    #[test]
    fn numbers_and_scaling() {
        assert_eq!(apply_op(&TransformOp::ParseNumber, text("1,234.5")), Ok(Value::Number(1234.5)));
        assert_eq!(
            apply_ops(
                &[TransformOp::ParseNumber, TransformOp::Scale { factor: 60.0 }],
                text("4.5")
            ),
            Ok(Value::Number(270.0))
        );
        assert_eq!(
            apply_op(&TransformOp::ParseNumber, text("NaN")),
            Err(TransformError::InvalidNumber("NaN".to_string()))
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(apply_op(&TransformOp::ParseBoolean, text("Yes")), Ok(Value::Boolean(true)));
        assert_eq!(apply_op(&TransformOp::ParseBoolean, Value::Number(0.0)), Ok(Value::Boolean(false)));
        assert!(apply_op(&TransformOp::ParseBoolean, text("maybe")).is_err());
    }

    #[test]
    fn text_ops() {
        assert_eq!(apply_op(&TransformOp::Trim, text("  E12 ")), Ok(text("E12")));
        assert_eq!(apply_op(&TransformOp::Uppercase, text("e12")), Ok(text("E12")));
        assert_eq!(apply_op(&TransformOp::Lowercase, Value::Boolean(true)), Ok(text("true")));
    }

    #[test]
    fn format_date() {
        let op = TransformOp::FormatDate {
            format: "%m/%d/%Y".to_string(),
        };
        assert_eq!(apply_op(&op, text("2024-01-15T08:30:45")), Ok(text("01/15/2024")));
        assert_eq!(
            apply_op(&op, Value::Number(3.0)),
            Err(TransformError::Unsupported {
                op: "Format Date",
                kind: "number"
            })
        );
    }

    #[test]
    fn bad_format_string_is_an_error() {
        let op = TransformOp::FormatDate {
            format: "%Q".to_string(),
        };
        assert_eq!(
            apply_op(&op, text("2024-01-15")),
            Err(TransformError::InvalidFormat("%Q".to_string()))
        );
    }
}
