//! JSON Lines row source.
//!
//! Each non-blank line of the input is one JSON row. Columns pick fields out
//! of a row by key, or by JSON pointer when the field starts with `/`, and
//! convert them to [`ReportValue`]s according to a [`FieldKind`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use report_core::{ColumnType, ReportValue};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Lines};
use std::str::FromStr;
use thiserror::Error;

/// Reading the JSON Lines input failed. Line numbers are one-based.
#[derive(Debug, Error)]
pub enum JsonlError {
    #[error("Error reading line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing JSON at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON field could not be converted to the declared kind.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid datetime format: {0}. Expected ISO 8601 format")]
    InvalidDateTime(String),

    #[error("Invalid integer: {0}")]
    InvalidInteger(String),
}

/// Rows parsed from a JSON Lines reader. Blank lines are skipped.
pub struct JsonlRows<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> JsonlRows<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Number of lines consumed so far, blank lines included.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for JsonlRows<R> {
    type Item = Result<Value, JsonlError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line += 1;

            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(JsonlError::Io {
                        line: self.line,
                        source,
                    }))
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            return Some(serde_json::from_str(&line).map_err(|source| JsonlError::Parse {
                line: self.line,
                source,
            }));
        }
    }
}

/// How a JSON field is read into a report value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Follow the JSON type: strings are text, integers are integers, other
    /// numbers are floats.
    #[default]
    Auto,
    Text,
    /// Exact decimal from a JSON string or number.
    Decimal,
    /// `YYYY-MM-DD`.
    Date,
    /// ISO 8601 date-time. Values with an offset are converted to UTC.
    DateTime,
    EpochSeconds,
    EpochMillis,
}

impl FieldKind {
    /// Column type tag for kinds that carry epoch timestamps.
    pub fn column_type(self) -> Option<ColumnType> {
        match self {
            FieldKind::EpochSeconds => Some(ColumnType::EpochSeconds),
            FieldKind::EpochMillis => Some(ColumnType::EpochMillis),
            _ => None,
        }
    }
}

/// Look up `field` in `row`. Fields starting with `/` are JSON pointers.
pub fn lookup<'a>(row: &'a Value, field: &str) -> Option<&'a Value> {
    if field.starts_with('/') {
        row.pointer(field)
    } else {
        row.get(field)
    }
}

/// Convert one JSON value. JSON `null` is always [`ReportValue::Null`].
pub fn json_to_report_value(value: &Value, kind: FieldKind) -> Result<ReportValue, ConversionError> {
    match (kind, value) {
        (_, Value::Null) => Ok(ReportValue::Null),

        (FieldKind::Auto, Value::Bool(b)) => Ok(ReportValue::Bool(*b)),
        (FieldKind::Auto, Value::Number(n)) => Ok(match n.as_i64() {
            Some(i) => ReportValue::Integer(i),
            None => match n.as_f64() {
                Some(f) => ReportValue::Float(f),
                None => ReportValue::Text(n.to_string()),
            },
        }),
        (FieldKind::Auto, Value::String(s)) => Ok(ReportValue::Text(s.clone())),
        (FieldKind::Auto, other) => Ok(ReportValue::Text(other.to_string())),

        (FieldKind::Text, Value::String(s)) => Ok(ReportValue::Text(s.clone())),
        (FieldKind::Text, other) => Ok(ReportValue::Text(other.to_string())),

        // Decimals are best sent as strings; numbers go through f64 in serde_json.
        (FieldKind::Decimal, Value::String(s)) => parse_decimal(s.trim()),
        (FieldKind::Decimal, Value::Number(n)) => parse_decimal(&n.to_string()),

        (FieldKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(ReportValue::Date)
            .map_err(|_| ConversionError::InvalidDate(s.clone())),

        (FieldKind::DateTime, Value::String(s)) => parse_datetime(s)
            .map(ReportValue::DateTime)
            .ok_or_else(|| ConversionError::InvalidDateTime(s.clone())),

        (FieldKind::EpochSeconds | FieldKind::EpochMillis, Value::Number(n)) => n
            .as_i64()
            .map(ReportValue::Integer)
            .ok_or_else(|| ConversionError::InvalidInteger(n.to_string())),
        (FieldKind::EpochSeconds | FieldKind::EpochMillis, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(ReportValue::Integer)
            .map_err(|_| ConversionError::InvalidInteger(s.clone())),

        (kind, other) => Err(ConversionError::TypeMismatch {
            expected: expected_json_type(kind),
            actual: json_type_name(other),
        }),
    }
}

/// Build a column extractor reading `field` as `kind`. Missing fields are null.
pub fn field_extractor(
    field: String,
    kind: FieldKind,
) -> impl Fn(&Value) -> Result<ReportValue, ConversionError> + Send + Sync + 'static {
    move |row| match lookup(row, &field) {
        Some(value) => json_to_report_value(value, kind),
        None => Ok(ReportValue::Null),
    }
}

fn parse_decimal(s: &str) -> Result<ReportValue, ConversionError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map(ReportValue::Decimal)
        .map_err(|_| ConversionError::InvalidDecimal(s.to_string()))
}

/// Supports RFC 3339 and `YYYY-MM-DD[T ]HH:MM:SS[.fff]`.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(s, pattern).ok())
}

fn expected_json_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Decimal => "decimal string or number",
        FieldKind::EpochSeconds | FieldKind::EpochMillis => "integer",
        _ => "string",
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
