//! Forward conversion: ReportValue → display string.
//!
//! Rules are applied in a fixed precedence order:
//!
//! 1. Null values produce no text.
//! 2. A custom formatter registered for the value's kind wins outright.
//! 3. Text is returned verbatim.
//! 4. Decimals drop trailing fractional zeros and print in plain notation.
//! 5. Wall-clock date-times are read as UTC, shifted to the configured zone
//!    (if any) and printed with the date-time pattern.
//! 6. Dates are printed with the date pattern.
//! 7. Integers in epoch-seconds / epoch-millis columns are converted to the
//!    configured zone (UTC when none) and printed with the date-time pattern.
//! 8. Everything else uses its default textual representation.
//!
//! ## Patterns
//!
//! Patterns are chrono `strftime` strings. The defaults print an ISO date,
//! a space and an ISO time without fractional seconds or zone suffix.

use crate::error::{BoxError, FormatError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use report_core::{ColumnType, ReportValue, ValueKind};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Default date-time pattern (`2024-03-03 10:00:01`).
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default date pattern (`2024-03-03`).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A custom formatting function for one value kind.
pub type FormatFn = Arc<dyn Fn(&ReportValue) -> Result<String, BoxError> + Send + Sync>;

/// Registry of custom formatters keyed by concrete value kind.
#[derive(Clone, Default)]
pub struct CustomFormatters {
    formatters: HashMap<ValueKind, FormatFn>,
}

impl CustomFormatters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter, replacing any previous one for the same kind.
    pub fn insert<F>(&mut self, kind: ValueKind, formatter: F)
    where
        F: Fn(&ReportValue) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.formatters.insert(kind, Arc::new(formatter));
    }

    pub fn get(&self, kind: &ValueKind) -> Option<&FormatFn> {
        self.formatters.get(kind)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl fmt::Debug for CustomFormatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.formatters.keys()).finish()
    }
}

/// Formatting configuration shared by every column of one report.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Pattern for wall-clock date-times and epoch timestamps.
    pub date_time_format: String,

    /// Pattern for calendar dates.
    pub date_format: String,

    /// Target zone for date-time output. `None` leaves wall-clock values
    /// untouched and renders epoch timestamps in UTC.
    pub timezone: Option<Tz>,

    /// Per-kind overrides, consulted before any built-in rule.
    pub custom_formatters: CustomFormatters,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            timezone: None,
            custom_formatters: CustomFormatters::new(),
        }
    }
}

impl FormatConfig {
    /// Set the target timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Set the date-time pattern.
    pub fn with_date_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_time_format = pattern.into();
        self
    }

    /// Set the date pattern.
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// Check that both patterns can be rendered.
    ///
    /// A pattern is rejected when chrono cannot parse it or when it asks for
    /// fields the value does not have (a time field in the date pattern, an
    /// offset in either pattern).
    pub fn validate_patterns(&self) -> Result<(), FormatError> {
        format_with(
            NaiveDateTime::default().format(&self.date_time_format),
            "date-time",
            &self.date_time_format,
        )?;
        format_with(
            NaiveDate::default().format(&self.date_format),
            "date",
            &self.date_format,
        )?;
        Ok(())
    }
}

/// Format a value for one column.
///
/// Returns `Ok(None)` for null values; the encoder renders those as an empty
/// field.
pub fn format_value(
    value: &ReportValue,
    column_type: Option<ColumnType>,
    config: &FormatConfig,
) -> Result<Option<String>, FormatError> {
    let Some(kind) = value.kind() else {
        return Ok(None);
    };

    if let Some(formatter) = config.custom_formatters.get(&kind) {
        return formatter(value).map(Some).map_err(FormatError::Custom);
    }

    let text = match value {
        ReportValue::Null => return Ok(None),
        ReportValue::Text(s) => s.clone(),
        ReportValue::Decimal(d) => format_decimal(d),
        ReportValue::DateTime(dt) => {
            let local = apply_timezone(*dt, config.timezone);
            format_with(
                local.format(&config.date_time_format),
                "date-time",
                &config.date_time_format,
            )?
        }
        ReportValue::Date(d) => {
            format_with(d.format(&config.date_format), "date", &config.date_format)?
        }
        ReportValue::Integer(i) => match column_type {
            Some(ColumnType::EpochSeconds) => {
                let utc = DateTime::from_timestamp(*i, 0);
                format_epoch(utc, *i, "seconds", config)?
            }
            Some(ColumnType::EpochMillis) => {
                let utc = DateTime::from_timestamp_millis(*i);
                format_epoch(utc, *i, "milliseconds", config)?
            }
            None => i.to_string(),
        },
        // Debug keeps the fractional part on integral floats: 10.0, not 10.
        ReportValue::Float(f) => format!("{f:?}"),
        ReportValue::Bool(b) => b.to_string(),
        ReportValue::Opaque(v) => v.to_string(),
    };

    Ok(Some(text))
}

/// Strip trailing fractional zeros and print in plain notation.
///
/// `1.00` → `1`, `1.50` → `1.5`, `100` → `100`, `-0.0` → `0`.
pub fn format_decimal(value: &Decimal) -> String {
    value.normalize().to_string()
}

/// Read a wall-clock value as UTC and shift it into `timezone`.
pub fn apply_timezone(utc_wall_clock: NaiveDateTime, timezone: Option<Tz>) -> NaiveDateTime {
    match timezone {
        Some(tz) => Utc
            .from_utc_datetime(&utc_wall_clock)
            .with_timezone(&tz)
            .naive_local(),
        None => utc_wall_clock,
    }
}

fn format_epoch(
    utc: Option<DateTime<Utc>>,
    value: i64,
    unit: &'static str,
    config: &FormatConfig,
) -> Result<String, FormatError> {
    let utc = utc.ok_or(FormatError::EpochOutOfRange { value, unit })?;
    let local = match config.timezone {
        Some(tz) => utc.with_timezone(&tz).naive_local(),
        None => utc.naive_utc(),
    };
    format_with(
        local.format(&config.date_time_format),
        "date-time",
        &config.date_time_format,
    )
}

// chrono reports bad patterns as fmt::Error at write time; `to_string` would panic.
fn format_with<D: fmt::Display>(
    display: D,
    kind: &'static str,
    pattern: &str,
) -> Result<String, FormatError> {
    let mut out = String::new();
    write!(out, "{display}").map_err(|_| FormatError::InvalidPattern {
        kind,
        pattern: pattern.to_string(),
    })?;
    Ok(out)
}
