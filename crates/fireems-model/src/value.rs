//! Record values.
//!
//! Uploaded rows arrive with vendor-dependent field names and loosely typed
//! cells. Internally every cell is one of a small closed set of kinds so the
//! transformer never has to reason about arbitrary JSON.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One row of source or output data, keyed by column / field id.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Builds a value from a raw CSV cell. Blank cells become `Null`.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Null
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Null` and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Text form of the value; borrowed when the value already is text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(text) => Cow::Borrowed(text.as_str()),
            Value::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(text) => f.write_str(text),
            Value::Number(number) => write!(f, "{number}"),
            Value::Boolean(flag) => write!(f, "{flag}"),
            Value::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Value::Time(time) => write!(f, "{}", time.format(TIME_FORMAT)),
            Value::DateTime(datetime) => write!(f, "{}", datetime.format(DATETIME_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Boolean(flag),
            serde_json::Value::Number(number) => {
                number.as_f64().map_or(Value::Null, Value::Number)
            }
            serde_json::Value::String(text) => Value::Text(text),
            // Arrays and objects have no semantic kind of their own.
            nested => Value::Text(nested.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Number(number) => serializer.serialize_f64(*number),
            Value::Boolean(flag) => serializer.serialize_bool(*flag),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cells_are_null() {
        assert_eq!(Value::from_cell("   "), Value::Null);
        assert_eq!(Value::from_cell(" E12 "), Value::Text("E12".to_string()));
    }

    #[test]
    fn temporal_values_serialize_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let value = Value::DateTime(date.and_hms_opt(8, 30, 45).unwrap());
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            "\"2024-01-15T08:30:45\""
        );
        assert_eq!(Value::Date(date).to_string(), "2024-01-15");
    }

    #[test]
    fn nested_json_collapses_to_text() {
        let value: Value = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(value, Value::Text("[1,2]".to_string()));
        let value: Value = serde_json::from_str("12.5").unwrap();
        assert_eq!(value, Value::Number(12.5));
    }
}
