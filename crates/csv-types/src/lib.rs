//! CSV value formatting and field encoding for report-core types.
//!
//! This crate turns report-core's [`ReportValue`](report_core::ReportValue)
//! into CSV field text and makes that text safe to place in a CSV line.
//!
//! # Modules
//!
//! - [`forward`] - ReportValue → display string (dates, decimals, custom overrides)
//! - [`escape`] - display string → CSV-safe field text
//! - [`writer`] - encoded records → any `io::Write` sink
//! - [`error`] - formatting errors
//!
//! # Example
//!
//! ```
//! use csv_types::{escape_csv, format_value, FormatConfig};
//! use report_core::ReportValue;
//! use rust_decimal::Decimal;
//!
//! let config = FormatConfig::default();
//! let text = format_value(&ReportValue::from(Decimal::new(150, 2)), None, &config).unwrap();
//! assert_eq!(text.as_deref(), Some("1.5"));
//!
//! assert_eq!(escape_csv("a,b"), "\"a,b\"");
//! ```

pub mod error;
pub mod escape;
pub mod forward;
pub mod writer;

pub use error::{BoxError, FormatError};
pub use escape::{encode_field, encode_record, escape_csv, needs_quoting};
pub use forward::{
    format_value, CustomFormatters, FormatConfig, FormatFn, DEFAULT_DATE_FORMAT,
    DEFAULT_DATE_TIME_FORMAT,
};
pub use writer::CsvRecordWriter;
